//! Supabase 相容後端（GoTrue 驗證、PostgREST 資料表、Storage 物件儲存）的 HTTP 轉接器。
//!
//! 所有請求都帶 `apikey` 標頭；`Authorization` 使用呼叫者的 access token，
//! 匿名呼叫時退回 anon key，讓後端的資料列權限（RLS）決定可見範圍。

pub mod auth;
pub mod rest;
pub mod storage;

use crate::config::SupabaseConfig;
use crate::domain::ports::RequestContext;
use crate::utils::error::{Result, SiteError};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, anon_key)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    pub fn from_config(config: &SupabaseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self::with_client(client, &config.url, &config.anon_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder, ctx: &RequestContext) -> RequestBuilder {
        let bearer = ctx.access_token().unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }
}

/// 非 2xx 回應轉成 `BackendError`，訊息取自後端 JSON 的常見欄位
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|key| json.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.clone()
            }
        });

    tracing::debug!("Backend responded {}: {}", status, body);

    Err(SiteError::BackendError {
        status: status.as_u16(),
        message,
    })
}
