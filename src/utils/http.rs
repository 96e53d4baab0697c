use anyhow::Result;
use std::time::Duration;

/// AI 接口专用 HTTP client，连接与整体请求共用同一超时
pub fn build_ai_client(timeout_secs: u64) -> Result<reqwest::Client> {
    let timeout = Duration::from_secs(timeout_secs);
    let client = reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .gzip(true)
        .build()?;
    Ok(client)
}
