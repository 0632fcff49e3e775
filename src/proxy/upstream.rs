//! Forwarding to the data API and failure translation.
//!
//! One shared client for every forwarding call — the pool is owned by
//! [`Upstream`], constructed once at startup and injected into handlers. An
//! upstream-returned error status is passed through verbatim with the detail
//! lifted from its body; anything below the HTTP-response level becomes a
//! fixed bad-gateway condition. No retries.

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::Client;
use serde_json::Value;

use crate::error::ApiError;

const TIMEOUT_SECS: u64 = 60;
const MAX_IDLE_CONNECTIONS: usize = 10;

#[derive(Debug, Clone)]
pub struct Upstream {
    client: Client,
    base_url: String,
}

impl Upstream {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `path` on the data API and return its JSON body.
    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::BadGateway(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| ApiError::BadGateway(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Upstream {
            status,
            detail: extract_detail(&body, status),
        })
    }
}

/// Best-effort human-readable detail from an upstream error body: the JSON
/// `detail` field when present, the raw text otherwise.
fn extract_detail(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(detail) = value.get("detail") {
            return detail
                .as_str()
                .map_or_else(|| detail.to_string(), str::to_string);
        }
    }
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}
