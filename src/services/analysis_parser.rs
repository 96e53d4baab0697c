//! 将模型返回的文本整理成 [`StockAnalysisResult`]。
//!
//! 先尝试按 JSON 解析（容忍 ```json 代码块包裹），失败后再按中文小节标题从原文中截取。

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::models::ai::{Recommendation, StockAnalysisResult};

pub const NO_INVESTMENT_ADVICE: &str = "暂无详细建议";
pub const NO_RISK_ASSESSMENT: &str = "暂无风险评估";
pub const NO_TECHNICAL_ANALYSIS: &str = "暂无技术面分析";
pub const NO_FUNDAMENTAL_ANALYSIS: &str = "暂无基本面分析";

/// 结果来源，便于区分模型是否按要求返回了 JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseSource {
    Json,
    TextFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnalysis {
    pub result: StockAnalysisResult,
    pub source: ParseSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    InvestmentAdvice,
    RiskAssessment,
    TechnicalAnalysis,
    FundamentalAnalysis,
}

impl Section {
    const ALL: [Section; 4] = [
        Section::InvestmentAdvice,
        Section::RiskAssessment,
        Section::TechnicalAnalysis,
        Section::FundamentalAnalysis,
    ];

    fn label(self) -> &'static str {
        match self {
            Section::InvestmentAdvice => "详细投资建议",
            Section::RiskAssessment => "风险评估",
            Section::TechnicalAnalysis => "技术面分析",
            Section::FundamentalAnalysis => "基本面分析",
        }
    }

    fn json_key(self) -> &'static str {
        match self {
            Section::InvestmentAdvice => "investmentAdvice",
            Section::RiskAssessment => "riskAssessment",
            Section::TechnicalAnalysis => "technicalAnalysis",
            Section::FundamentalAnalysis => "fundamentalAnalysis",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            Section::InvestmentAdvice => NO_INVESTMENT_ADVICE,
            Section::RiskAssessment => NO_RISK_ASSESSMENT,
            Section::TechnicalAnalysis => NO_TECHNICAL_ANALYSIS,
            Section::FundamentalAnalysis => NO_FUNDAMENTAL_ANALYSIS,
        }
    }

    /// 标题后紧跟全角或半角冒号
    fn heading(self) -> &'static Regex {
        static HEADINGS: OnceLock<Vec<Regex>> = OnceLock::new();
        let headings = HEADINGS.get_or_init(|| {
            Section::ALL
                .iter()
                .map(|s| {
                    Regex::new(&format!("{}[：:]", regex::escape(s.label())))
                        .expect("section heading pattern")
                })
                .collect()
        });
        &headings[self as usize]
    }
}

/// 任意小节标题（不含冒号），用于确定上一小节的结束位置
fn any_label() -> &'static Regex {
    static LABELS: OnceLock<Regex> = OnceLock::new();
    LABELS.get_or_init(|| {
        let alternatives: Vec<String> = Section::ALL.iter().map(|s| regex::escape(s.label())).collect();
        Regex::new(&alternatives.join("|")).expect("section label pattern")
    })
}

/// 依次尝试 JSON 与文本截取，总能得到一个结果
pub fn parse_analysis_content(content: &str) -> ParsedAnalysis {
    let cleaned = strip_code_fence(content);
    match parse_json_analysis(cleaned) {
        Ok(result) => ParsedAnalysis {
            result,
            source: ParseSource::Json,
        },
        Err(e) => {
            log::warn!("详细分析结果不是合法 JSON，改为按小节截取: {}", e);
            ParsedAnalysis {
                result: extract_analysis_from_text(content),
                source: ParseSource::TextFallback,
            }
        }
    }
}

/// 去掉首行 ``` / ```json 与结尾的 ```
pub fn strip_code_fence(content: &str) -> &str {
    let mut cleaned = content.trim();
    if cleaned.starts_with("```") {
        if let Some(first_line_end) = cleaned.find('\n') {
            cleaned = &cleaned[first_line_end + 1..];
        }
    }
    if let Some(stripped) = cleaned.strip_suffix("```") {
        cleaned = stripped.trim();
    }
    cleaned
}

/// 字段原样转成文本：字符串取内容，数字、布尔、对象等用 JSON 文本，null 视为缺失
fn json_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// 严格解析 JSON 对象，缺失或为 null 的字段使用占位文本
pub fn parse_json_analysis(text: &str) -> anyhow::Result<StockAnalysisResult> {
    let value: Value = serde_json::from_str(text)?;
    let obj = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("期望 JSON 对象，实际为: {}", json_kind(&value)))?;

    let field = |section: Section| -> String {
        json_text(obj.get(section.json_key())).unwrap_or_else(|| section.placeholder().to_string())
    };

    Ok(StockAnalysisResult {
        recommendation: json_text(obj.get("recommendation"))
            .map(|text| Recommendation::classify(&text))
            .unwrap_or_default(),
        investment_advice: field(Section::InvestmentAdvice),
        risk_assessment: field(Section::RiskAssessment),
        technical_analysis: field(Section::TechnicalAnalysis),
        fundamental_analysis: field(Section::FundamentalAnalysis),
    })
}

/// 从非结构化文本中按小节标题截取，小节顺序不限，缺失的小节使用占位文本
pub fn extract_analysis_from_text(text: &str) -> StockAnalysisResult {
    StockAnalysisResult {
        recommendation: Recommendation::classify(text),
        investment_advice: extract_section(text, Section::InvestmentAdvice),
        risk_assessment: extract_section(text, Section::RiskAssessment),
        technical_analysis: extract_section(text, Section::TechnicalAnalysis),
        fundamental_analysis: extract_section(text, Section::FundamentalAnalysis),
    }
}

fn extract_section(text: &str, section: Section) -> String {
    let Some(heading) = section.heading().find(text) else {
        return section.placeholder().to_string();
    };
    let start = heading.end();
    // 截到下一个其他小节标题为止
    let end = any_label()
        .find_iter(&text[start..])
        .find(|m| m.as_str() != section.label())
        .map(|m| start + m.start())
        .unwrap_or(text.len());
    text[start..end].trim().to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
