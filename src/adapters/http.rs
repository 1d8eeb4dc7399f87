use crate::utils::error::{LabelError, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 對外 HTTP 呼叫的逾時設定（秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpTimeouts {
    pub request_seconds: u64,
    pub connect_seconds: u64,
    pub read_seconds: u64,
    pub idle_seconds: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            request_seconds: 30,
            connect_seconds: 10,
            read_seconds: 10,
            idle_seconds: 10,
        }
    }
}

impl HttpTimeouts {
    /// Vision calls routinely take several seconds to produce a first byte.
    pub fn vision() -> Self {
        Self {
            request_seconds: 60,
            read_seconds: 60,
            ..Self::default()
        }
    }
}

/// Builds a client where no phase of a call can hang indefinitely:
/// connect (which covers the TLS handshake), each read, idle pooled
/// connections and the request as a whole are all bounded.
pub fn build_client(timeouts: &HttpTimeouts) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeouts.request_seconds))
        .connect_timeout(Duration::from_secs(timeouts.connect_seconds))
        .read_timeout(Duration::from_secs(timeouts.read_seconds))
        .pool_idle_timeout(Duration::from_secs(timeouts.idle_seconds))
        .build()?;
    Ok(client)
}

/// 讀取回應內容：非 2xx 時以原始內容作為錯誤訊息，2xx 但無法解析時回報格式錯誤
pub async fn read_json<T: DeserializeOwned>(response: Response, source_name: &str) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::debug!("📡 {} responded with status {}", source_name, status);
        return Err(LabelError::StatusError {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| LabelError::malformed(source_name, e.to_string()))
}
