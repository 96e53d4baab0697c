use crate::models::ai::Recommendation;
use crate::AppState;

/// 一句话建议，接口失败时为持有
pub async fn quick_recommendation(state: &AppState, code: &str) -> Result<Recommendation, String> {
    let stock = state
        .watchlist
        .find_by_code(code)
        .ok_or_else(|| format!("未找到股票: {}", code))?;

    Ok(state
        .ai
        .quick_recommendation_or_hold(&stock.name, &stock.code, &stock.price, &stock.change_percent)
        .await)
}
