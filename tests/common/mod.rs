//! 本地 mock chat-completion 服务，避免测试依赖真实 AI 接口

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

type Responder = dyn Fn(&str) -> (u16, String) + Send + Sync;

pub struct MockChatServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl MockChatServer {
    /// responder 收到完整请求报文，返回 (状态码, 响应体)
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder: Arc<Responder> = Arc::new(responder);

        let recorded = requests.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let request = read_request(&mut stream).await;
                recorded.lock().unwrap().push(request.clone());
                let (status, body) = responder(&request);
                let resp = format!(
                    "HTTP/1.1 {} MOCK\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{}/v1", port),
            requests,
            handle,
        }
    }

    /// 固定返回同一个响应
    pub async fn always(status: u16, body: String) -> Self {
        Self::start(move |_| (status, body.clone())).await
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// 请求报文中的 JSON body
pub fn request_json(request: &str) -> serde_json::Value {
    let body = request.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("");
    serde_json::from_str(body).unwrap()
}

/// 标准 chat-completion 成功响应
pub fn chat_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-mock",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150 }
    })
    .to_string()
}

pub const FULL_ANALYSIS_JSON: &str = r#"{
  "recommendation": "买入",
  "investmentAdvice": "回调至均线附近分批买入",
  "riskAssessment": "风险等级：中\n消费需求波动",
  "technicalAnalysis": "均线多头排列，量能温和放大",
  "fundamentalAnalysis": "品牌力强，现金流充沛"
}"#;
