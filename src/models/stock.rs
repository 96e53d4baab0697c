use serde::{Deserialize, Serialize};
use std::fmt;

use super::ai::{Recommendation, StockAnalysisResult};

/// 股票条目（目录与自选股共用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub name: String,
    pub code: String,           // "600519"
    pub price: String,          // 展示用文本，不参与计算
    pub change_percent: String, // "+2.35%"
    pub is_up: bool,
    #[serde(default)]
    pub is_analyzing: bool,
    #[serde(default)]
    pub recommendation: Verdict,
    #[serde(default)]
    pub analysis_result: Option<StockAnalysisResult>,
    #[serde(default)]
    pub analyzed_at: Option<String>,
}

impl StockRecord {
    /// 涨跌方向由 change_percent 的首字符决定，只在构造时计算一次
    pub fn new(name: &str, code: &str, price: &str, change_percent: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            price: price.to_string(),
            change_percent: change_percent.to_string(),
            is_up: change_percent.starts_with('+'),
            is_analyzing: false,
            recommendation: Verdict::Pending,
            analysis_result: None,
            analyzed_at: None,
        }
    }

    /// 目录条目：没有行情，价格与涨跌幅使用占位值
    pub fn placeholder(name: &str, code: &str) -> Self {
        Self {
            is_up: false,
            ..Self::new(name, code, "0.00", "0.00%")
        }
    }
}

/// 自选股上显示的建议标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Verdict {
    #[default]
    #[serde(rename = "")]
    Pending,
    #[serde(rename = "买入")]
    Buy,
    #[serde(rename = "卖出")]
    Sell,
    #[serde(rename = "持有")]
    Hold,
    #[serde(rename = "分析失败")]
    Failed,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pending => "",
            Verdict::Buy => "买入",
            Verdict::Sell => "卖出",
            Verdict::Hold => "持有",
            Verdict::Failed => "分析失败",
        }
    }
}

impl From<Recommendation> for Verdict {
    fn from(rec: Recommendation) -> Self {
        match rec {
            Recommendation::Buy => Verdict::Buy,
            Recommendation::Sell => Verdict::Sell,
            Recommendation::Hold => Verdict::Hold,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 自选股为空时批量分析使用的示例股票
pub fn sample_stocks() -> Vec<StockRecord> {
    vec![
        StockRecord::new("贵州茅台", "600519", "1789.00", "+2.35%"),
        StockRecord::new("腾讯控股", "00700", "368.40", "+1.52%"),
        StockRecord::new("阿里巴巴", "09988", "75.80", "-0.65%"),
        StockRecord::new("中国平安", "601318", "42.56", "-1.23%"),
        StockRecord::new("宁德时代", "300750", "135.20", "+3.45%"),
    ]
}
