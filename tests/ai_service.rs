//! AIService 与 mock chat-completion 接口的交互测试

mod common;

use common::{chat_body, request_json, MockChatServer, FULL_ANALYSIS_JSON};
use stock_watch::models::ai::{AIConfig, Recommendation, StockAnalysisResult};
use stock_watch::services::ai_service::{AIService, AnalysisError};
use stock_watch::services::analysis_parser::ParseSource;

fn service(server: &MockChatServer) -> AIService {
    AIService::new(AIConfig {
        base_url: server.base_url.clone(),
        api_key: "sk-test".to_string(),
        ..AIConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_detailed_analysis_server_error_yields_default() {
    let server = MockChatServer::always(500, r#"{"error":"internal"}"#.to_string()).await;
    let ai = service(&server);

    let err = ai.get_detailed_analysis("贵州茅台", "600519", "1789.00", "+2.35%").await.unwrap_err();
    match err {
        AnalysisError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert!(body.contains("internal"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let result = ai.get_detailed_analysis_or_default("贵州茅台", "600519", "1789.00", "+2.35%").await;
    assert_eq!(result, AIService::default_result());
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn test_detailed_analysis_fenced_json() {
    let content = format!("```json\n{}\n```", FULL_ANALYSIS_JSON);
    let server = MockChatServer::always(200, chat_body(&content)).await;
    let ai = service(&server);

    let parsed = ai.get_detailed_analysis("贵州茅台", "600519", "1789.00", "+2.35%").await.unwrap();
    assert_eq!(parsed.source, ParseSource::Json);
    assert_eq!(
        parsed.result,
        StockAnalysisResult {
            recommendation: Recommendation::Buy,
            investment_advice: "回调至均线附近分批买入".to_string(),
            risk_assessment: "风险等级：中\n消费需求波动".to_string(),
            technical_analysis: "均线多头排列，量能温和放大".to_string(),
            fundamental_analysis: "品牌力强，现金流充沛".to_string(),
        }
    );
}

#[tokio::test]
async fn test_detailed_analysis_unstructured_sell() {
    let content = "风险评估：估值处于高位\n综合判断建议卖出，落袋为安。";
    let server = MockChatServer::always(200, chat_body(content)).await;
    let ai = service(&server);

    let parsed = ai.get_detailed_analysis("中国平安", "601318", "42.56", "-1.23%").await.unwrap();
    assert_eq!(parsed.source, ParseSource::TextFallback);
    assert_eq!(parsed.result.recommendation, Recommendation::Sell);
    assert_eq!(parsed.result.risk_assessment, "估值处于高位\n综合判断建议卖出，落袋为安。");
    assert_eq!(parsed.result.technical_analysis, "暂无技术面分析");
}

#[tokio::test]
async fn test_detailed_analysis_request_shape() {
    let server = MockChatServer::always(200, chat_body(FULL_ANALYSIS_JSON)).await;
    let ai = service(&server);
    ai.get_detailed_analysis("贵州茅台", "600519", "1789.00", "+2.35%").await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("POST /v1/chat/completions"));
    assert!(requests[0].to_lowercase().contains("authorization: bearer sk-test"));

    let body = request_json(&requests[0]);
    assert_eq!(body["model"], "deepseek-chat");
    assert_eq!(body["max_tokens"], 1000);
    assert_eq!(body["temperature"], 0.3);
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["role"], "user");
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("贵州茅台"));
    assert!(prompt.contains("600519"));
    assert!(prompt.contains("fundamentalAnalysis"));
}

#[tokio::test]
async fn test_quick_recommendation() {
    let server = MockChatServer::always(200, chat_body(" 买入 ")).await;
    let ai = service(&server);

    let rec = ai.quick_recommendation("宁德时代", "300750", "135.20", "+3.45%").await.unwrap();
    assert_eq!(rec, Recommendation::Buy);

    let body = request_json(&server.requests()[0]);
    assert_eq!(body["max_tokens"], 10);
    assert!(body["messages"][0]["content"].as_str().unwrap().contains("只回复一个词"));
}

#[tokio::test]
async fn test_quick_recommendation_unclassified_text_is_hold() {
    let server = MockChatServer::always(200, chat_body("观望")).await;
    let ai = service(&server);
    let rec = ai.quick_recommendation("宁德时代", "300750", "135.20", "+3.45%").await.unwrap();
    assert_eq!(rec, Recommendation::Hold);
}

#[tokio::test]
async fn test_quick_recommendation_failure_defaults_to_hold() {
    let server = MockChatServer::always(503, "busy".to_string()).await;
    let ai = service(&server);

    let err = ai.quick_recommendation("宁德时代", "300750", "135.20", "+3.45%").await.unwrap_err();
    assert!(matches!(err, AnalysisError::Status { .. }));

    let rec = ai.quick_recommendation_or_hold("宁德时代", "300750", "135.20", "+3.45%").await;
    assert_eq!(rec, Recommendation::Hold);
}

#[tokio::test]
async fn test_malformed_and_empty_responses() {
    let server = MockChatServer::always(200, "<html>gateway</html>".to_string()).await;
    let ai = service(&server);
    let err = ai.get_detailed_analysis("贵州茅台", "600519", "1789.00", "+2.35%").await.unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse(_)));

    let server = MockChatServer::always(200, r#"{"choices":[]}"#.to_string()).await;
    let ai = service(&server);
    let err = ai.get_detailed_analysis("贵州茅台", "600519", "1789.00", "+2.35%").await.unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyContent));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let server = MockChatServer::always(200, chat_body("买入")).await;
    let base_url = server.base_url.clone();
    drop(server);
    // 让被 abort 的监听任务释放端口
    tokio::task::yield_now().await;

    let ai = AIService::new(AIConfig {
        base_url,
        api_key: "sk-test".to_string(),
        timeout_secs: 2,
        ..AIConfig::default()
    })
    .unwrap();
    let result = ai.get_detailed_analysis_or_default("贵州茅台", "600519", "1789.00", "+2.35%").await;
    assert_eq!(result, AIService::default_result());
}
