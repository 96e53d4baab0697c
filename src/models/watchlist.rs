use serde::{Deserialize, Serialize};

use super::ai::Recommendation;

/// 批量分析过程中推送给前端的状态事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AnalysisEvent {
    Started { code: String },
    /// used_default 为 true 表示接口失败，写回的是默认结果
    Completed {
        code: String,
        recommendation: Recommendation,
        used_default: bool,
    },
    Failed { code: String, error: String },
}

/// 一次批量分析的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub analyzed: usize,
    /// analyzed 中接口失败、按默认结果写回的条目
    pub defaulted: usize,
    pub failed: usize,
    /// 分析期间已被移出自选股的条目
    pub skipped: usize,
    /// 自选股为空时使用了示例股票
    pub used_samples: bool,
}
