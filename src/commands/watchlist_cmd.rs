use tokio::sync::mpsc;

use crate::models::ai::StockAnalysisResult;
use crate::models::stock::StockRecord;
use crate::models::watchlist::{AnalysisEvent, BatchSummary};
use crate::AppState;

/// 从全部股票中按代码加入自选
pub fn add_watchlist_stock(state: &AppState, code: &str) -> Result<StockRecord, String> {
    let stock = state
        .catalog
        .find_by_code(code)
        .cloned()
        .ok_or_else(|| format!("未找到股票: {}", code))?;

    if !state.watchlist.add(stock.clone()) {
        return Err(format!("{} 已在自选股中", code));
    }
    Ok(stock)
}

/// 加入调用方提供的股票（例如带有行情的条目）
pub fn add_custom_stock(state: &AppState, stock: StockRecord) -> Result<(), String> {
    let code = stock.code.clone();
    if !state.watchlist.add(stock) {
        return Err(format!("{} 已在自选股中", code));
    }
    Ok(())
}

pub fn remove_watchlist_stock(state: &AppState, code: &str) -> bool {
    state.watchlist.remove(code)
}

pub fn get_watchlist_stocks(state: &AppState) -> Vec<StockRecord> {
    state.watchlist.stocks()
}

pub fn is_in_watchlist(state: &AppState, code: &str) -> bool {
    state.watchlist.contains(code)
}

/// 逐只分析自选股，进度通过 events 推送。
/// 通道满时事件会被丢弃，调用方需要及时读取或给足容量。
pub async fn analyze_watchlist(
    state: &AppState,
    events: Option<mpsc::Sender<AnalysisEvent>>,
) -> BatchSummary {
    state.watchlist.analyze_all_with_events(events).await
}

pub async fn get_stock_detailed_analysis(state: &AppState, code: &str) -> StockAnalysisResult {
    state.watchlist.get_detailed_analysis(code).await
}
