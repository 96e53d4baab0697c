use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

use crate::models::ai::StockAnalysisResult;
use crate::models::stock::{sample_stocks, StockRecord, Verdict};
use crate::models::watchlist::{AnalysisEvent, BatchSummary};
use crate::services::ai_service::AIService;
use crate::services::stock_catalog::StockCatalog;

/// 自选股列表（仅内存），并负责逐只调用 AI 分析
pub struct WatchlistStore {
    catalog: Arc<StockCatalog>,
    ai: Arc<AIService>,
    stocks: Mutex<Vec<StockRecord>>,
}

impl WatchlistStore {
    pub fn new(catalog: Arc<StockCatalog>, ai: Arc<AIService>) -> Self {
        Self {
            catalog,
            ai,
            stocks: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StockRecord>> {
        self.stocks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 添加自选股，代码已存在时返回 false 且不做修改
    pub fn add(&self, stock: StockRecord) -> bool {
        let mut stocks = self.lock();
        if stocks.iter().any(|s| s.code == stock.code) {
            return false;
        }
        log::info!("添加自选股: {} ({})", stock.name, stock.code);
        stocks.push(stock);
        true
    }

    pub fn remove(&self, code: &str) -> bool {
        let mut stocks = self.lock();
        match stocks.iter().position(|s| s.code == code) {
            Some(idx) => {
                stocks.remove(idx);
                log::info!("移除自选股: {}", code);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.lock().iter().any(|s| s.code == code)
    }

    /// 当前自选股快照（按添加顺序）
    pub fn stocks(&self) -> Vec<StockRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// 先查自选股，再查全部股票；自选股中的条目可能带有分析结果
    pub fn find_by_code(&self, code: &str) -> Option<StockRecord> {
        if let Some(stock) = self.lock().iter().find(|s| s.code == code) {
            return Some(stock.clone());
        }
        self.catalog.find_by_code(code).cloned()
    }

    pub async fn analyze_all(&self) -> BatchSummary {
        self.analyze_all_with_events(None).await
    }

    /// 逐只分析全部自选股。自选股为空时先把示例股票加入列表再分析。
    /// 每只股票的结果按代码写回；分析期间被移除的股票结果直接丢弃。
    ///
    /// 接口失败（密钥缺失、网络、非 2xx、响应格式不对）按默认结果（持有）写回；
    /// 只有分析任务本身异常终止时才标记为分析失败。
    /// 事件用 `try_send` 推送，通道满时丢弃并记日志，不会阻塞分析。
    pub async fn analyze_all_with_events(
        &self,
        events: Option<mpsc::Sender<AnalysisEvent>>,
    ) -> BatchSummary {
        let (batch, used_samples) = {
            let mut stocks = self.lock();
            let used_samples = stocks.is_empty();
            if used_samples {
                stocks.extend(sample_stocks());
            }
            for stock in stocks.iter_mut() {
                stock.is_analyzing = true;
            }
            (stocks.clone(), used_samples)
        };

        let mut summary = BatchSummary {
            total: batch.len(),
            used_samples,
            ..BatchSummary::default()
        };

        for stock in &batch {
            emit(&events, AnalysisEvent::Started { code: stock.code.clone() });
        }

        for stock in &batch {
            let event = match self.analyze_one(stock).await {
                Ok((result, used_default)) => {
                    let recommendation = result.recommendation;
                    let analyzed_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
                    let written = self.update(&stock.code, |s| {
                        s.recommendation = recommendation.into();
                        s.analysis_result = Some(result);
                        s.analyzed_at = Some(analyzed_at);
                        s.is_analyzing = false;
                    });
                    if !written {
                        summary.skipped += 1;
                        continue;
                    }
                    summary.analyzed += 1;
                    if used_default {
                        summary.defaulted += 1;
                    }
                    log::info!("股票分析完成: {}, 建议: {}", stock.name, recommendation);
                    AnalysisEvent::Completed {
                        code: stock.code.clone(),
                        recommendation,
                        used_default,
                    }
                }
                Err(e) => {
                    let written = self.update(&stock.code, |s| {
                        s.recommendation = Verdict::Failed;
                        s.is_analyzing = false;
                    });
                    if !written {
                        summary.skipped += 1;
                        continue;
                    }
                    summary.failed += 1;
                    log::error!("分析股票失败: {}: {}", stock.name, e);
                    AnalysisEvent::Failed {
                        code: stock.code.clone(),
                        error: e.to_string(),
                    }
                }
            };
            emit(&events, event);
        }

        summary
    }

    /// 单只股票的批量分析步骤。接口错误换成默认结果（第二个值为 true）；
    /// 任务 panic 或被取消时返回 Err。
    async fn analyze_one(
        &self,
        stock: &StockRecord,
    ) -> Result<(StockAnalysisResult, bool), tokio::task::JoinError> {
        let ai = self.ai.clone();
        let (name, code, price, change) = (
            stock.name.clone(),
            stock.code.clone(),
            stock.price.clone(),
            stock.change_percent.clone(),
        );
        let outcome = tokio::spawn(async move {
            ai.get_detailed_analysis(&name, &code, &price, &change).await
        })
        .await?;

        Ok(match outcome {
            Ok(parsed) => (parsed.result, false),
            Err(e) => {
                log::warn!("{}({}) 分析接口失败，使用默认结果: {}", stock.name, stock.code, e);
                (AIService::default_result(), true)
            }
        })
    }

    /// 获取单只股票的详细分析：找不到返回默认结果，已有结果直接返回，否则重新请求。
    /// 新请求的结果不会写回自选股。
    pub async fn get_detailed_analysis(&self, code: &str) -> StockAnalysisResult {
        let Some(stock) = self.find_by_code(code) else {
            return AIService::default_result();
        };

        if let Some(cached) = stock.analysis_result {
            return cached;
        }

        self.ai
            .get_detailed_analysis_or_default(&stock.name, &stock.code, &stock.price, &stock.change_percent)
            .await
    }

    fn update<F>(&self, code: &str, apply: F) -> bool
    where
        F: FnOnce(&mut StockRecord),
    {
        let mut stocks = self.lock();
        match stocks.iter_mut().find(|s| s.code == code) {
            Some(stock) => {
                apply(stock);
                true
            }
            None => {
                log::warn!("股票 {} 已不在自选股中，丢弃分析结果", code);
                false
            }
        }
    }
}

fn emit(events: &Option<mpsc::Sender<AnalysisEvent>>, event: AnalysisEvent) {
    let Some(tx) = events else {
        return;
    };
    match tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(event)) => {
            log::warn!("分析事件通道已满，丢弃事件: {:?}", event);
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {}
    }
}
