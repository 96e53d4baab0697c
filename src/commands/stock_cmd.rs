use crate::models::stock::StockRecord;
use crate::AppState;

pub fn search_stocks(state: &AppState, keyword: &str) -> Vec<StockRecord> {
    state.catalog.search_stocks(keyword)
}

pub fn get_all_stocks(state: &AppState) -> Vec<StockRecord> {
    state.catalog.get_all_stocks().to_vec()
}

/// 自选股优先，其次全部股票
pub fn get_stock_by_code(state: &AppState, code: &str) -> Result<StockRecord, String> {
    state
        .watchlist
        .find_by_code(code)
        .ok_or_else(|| format!("未找到股票: {}", code))
}
