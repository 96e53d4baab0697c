use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer 凭证，由外部配置注入
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// 一句话建议的输出上限
    #[serde(default = "default_quick_max_tokens")]
    pub quick_max_tokens: u32,
    /// 详细分析的输出上限
    #[serde(default = "default_detail_max_tokens")]
    pub detail_max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String { "https://api.deepseek.com/v1".to_string() }
fn default_model_name() -> String { "deepseek-chat".to_string() }
fn default_temperature() -> f64 { 0.3 }
fn default_quick_max_tokens() -> u32 { 10 }
fn default_detail_max_tokens() -> u32 { 1000 }
fn default_timeout_secs() -> u64 { 30 }

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model_name: default_model_name(),
            temperature: default_temperature(),
            quick_max_tokens: default_quick_max_tokens(),
            detail_max_tokens: default_detail_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AIConfig {
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// 投资建议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "买入")]
    Buy,
    #[serde(rename = "卖出")]
    Sell,
    #[default]
    #[serde(rename = "持有")]
    Hold,
}

impl Recommendation {
    /// 按关键词归类模型输出，"买入" 优先于 "卖出"，都没有则视为持有
    pub fn classify(text: &str) -> Self {
        if text.contains("买入") {
            Recommendation::Buy
        } else if text.contains("卖出") {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Buy => "买入",
            Recommendation::Sell => "卖出",
            Recommendation::Hold => "持有",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 详细分析结果：建议 + 四段文字
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAnalysisResult {
    pub recommendation: Recommendation,
    pub investment_advice: String,
    pub risk_assessment: String,
    pub technical_analysis: String,
    pub fundamental_analysis: String,
}

// ========== Chat Completion 数据结构 ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    pub message: Option<ChatChoiceMessage>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoiceMessage {
    pub role: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    /// choices[0].message.content
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }
}
