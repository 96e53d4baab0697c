use anyhow::Result;
use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ai::*;
use crate::services::analysis_parser::{parse_analysis_content, ParseSource, ParsedAnalysis};
use crate::utils::http::build_ai_client;

/// AI 接口调用失败的原因。调用方据此决定使用哪个默认值。
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("未配置 AI 接口密钥")]
    MissingApiKey,

    #[error("AI API 请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AI API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("AI response parse error: {0}")]
    MalformedResponse(String),

    #[error("AI 返回空内容")]
    EmptyContent,
}

/// 与 chat-completion 接口交互，一次调用只发一个请求，不重试
#[derive(Debug, Clone)]
pub struct AIService {
    config: AIConfig,
    client: reqwest::Client,
}

impl AIService {
    pub fn new(config: AIConfig) -> Result<Self> {
        let client = build_ai_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    /// 一句话投资建议（买入/卖出/持有）
    pub async fn quick_recommendation(
        &self,
        name: &str,
        code: &str,
        price: &str,
        change_percent: &str,
    ) -> Result<Recommendation, AnalysisError> {
        let prompt = format!(
            "你是一位专业的股票分析师，请根据以下信息对股票进行简要分析并给出投资建议：\n\
            \n\
            股票名称: {}\n\
            股票代码: {}\n\
            当前价格: {}\n\
            涨跌幅: {}\n\
            \n\
            请只回复一个词的投资建议：买入、卖出或持有。不要解释原因，只回复一个词。",
            name, code, price, change_percent
        );

        let content = self.chat(&prompt, self.config.quick_max_tokens).await?;
        let recommendation = Recommendation::classify(&content);
        log::info!("{}({}) 快速建议: {} (原文: {})", name, code, recommendation, content);
        Ok(recommendation)
    }

    /// 任何失败都按持有处理
    pub async fn quick_recommendation_or_hold(
        &self,
        name: &str,
        code: &str,
        price: &str,
        change_percent: &str,
    ) -> Recommendation {
        match self.quick_recommendation(name, code, price, change_percent).await {
            Ok(rec) => rec,
            Err(e) => {
                log::error!("分析股票 {}({}) 时出错，默认持有: {}", name, code, e);
                Recommendation::Hold
            }
        }
    }

    /// 五个方面的详细分析
    pub async fn get_detailed_analysis(
        &self,
        name: &str,
        code: &str,
        price: &str,
        change_percent: &str,
    ) -> Result<ParsedAnalysis, AnalysisError> {
        let prompt = format!(
            "你是一位专业的股票分析师，请根据以下信息对股票进行详细分析：\n\
            \n\
            股票名称: {}\n\
            股票代码: {}\n\
            当前价格: {}\n\
            涨跌幅: {}\n\
            \n\
            请提供以下五个方面的分析，每个部分控制在100字以内：\n\
            1. 投资建议（买入/卖出/持有）\n\
            2. 详细投资建议\n\
            3. 风险评估\n\
            4. 技术面分析\n\
            5. 基本面分析\n\
            \n\
            请直接返回JSON格式，不要使用markdown代码块，格式如下：\n\
            {{\n\
              \"recommendation\": \"买入/卖出/持有\",\n\
              \"investmentAdvice\": \"详细投资建议...\",\n\
              \"riskAssessment\": \"风险评估...\",\n\
              \"technicalAnalysis\": \"技术面分析...\",\n\
              \"fundamentalAnalysis\": \"基本面分析...\"\n\
            }}",
            name, code, price, change_percent
        );

        let content = self.chat(&prompt, self.config.detail_max_tokens).await?;
        log::debug!("{}({}) 详细分析原始内容: {}", name, code, content);

        let parsed = parse_analysis_content(&content);
        if parsed.source == ParseSource::TextFallback {
            log::info!("{}({}) 详细分析使用文本截取结果", name, code);
        }
        Ok(parsed)
    }

    /// 任何失败都返回 [`AIService::default_result`]
    pub async fn get_detailed_analysis_or_default(
        &self,
        name: &str,
        code: &str,
        price: &str,
        change_percent: &str,
    ) -> StockAnalysisResult {
        match self.get_detailed_analysis(name, code, price, change_percent).await {
            Ok(parsed) => parsed.result,
            Err(e) => {
                log::error!("获取 {}({}) 详细分析时出错: {}", name, code, e);
                Self::default_result()
            }
        }
    }

    /// 无法获得可用回答时的固定结果
    pub fn default_result() -> StockAnalysisResult {
        StockAnalysisResult {
            recommendation: Recommendation::Hold,
            investment_advice: "由于无法获取实时数据，建议投资者持有观望，等待更多市场信息。".to_string(),
            risk_assessment: "风险等级：未知\n由于无法获取实时数据，无法评估当前风险水平。".to_string(),
            technical_analysis: "由于无法获取实时数据，无法提供技术面分析。建议投资者参考其他数据源。".to_string(),
            fundamental_analysis: "由于无法获取实时数据，无法提供基本面分析。建议投资者参考公司最新财报和行业动态。".to_string(),
        }
    }

    /// 发送单条 user 消息，返回 choices[0].message.content（已 trim）
    async fn chat(&self, prompt: &str, max_tokens: u32) -> Result<String, AnalysisError> {
        if self.config.api_key.trim().is_empty() {
            return Err(AnalysisError::MissingApiKey);
        }

        let req = ChatCompletionRequest {
            model: self.config.model_name.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.config.temperature,
            max_tokens,
        };

        let resp = self
            .client
            .post(self.config.chat_completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            log::error!("AI API 调用失败: {} {}", status, body);
            return Err(AnalysisError::Status { status, body });
        }

        let response: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            AnalysisError::MalformedResponse(format!("{} body: {}", e, truncate(&body, 200)))
        })?;

        if let Some(usage) = &response.usage {
            log::debug!(
                "AI token 用量: prompt {} completion {} total {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let content = response.first_content().map(str::trim).unwrap_or_default();
        if content.is_empty() {
            return Err(AnalysisError::EmptyContent);
        }
        Ok(content.to_string())
    }
}

/// 按字符截断，避免切在多字节字符中间
fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
