use crate::domain::model::{AuthUser, Session, SignUpOutcome, Upload};
use crate::domain::query::Query;
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 呼叫者身分：匿名或帶有 access token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    access_token: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.access_token.is_none()
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<SignUpOutcome>;

    async fn sign_out(&self, ctx: &RequestContext) -> Result<()>;

    /// 匿名或 token 失效時回傳 `None`
    async fn get_user(&self, ctx: &RequestContext) -> Result<Option<AuthUser>>;

    async fn update_password(&self, ctx: &RequestContext, new_password: &str) -> Result<AuthUser>;
}

#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, ctx: &RequestContext, query: &Query) -> Result<Vec<Value>>;

    /// 回傳新增後的資料列
    async fn insert(&self, ctx: &RequestContext, table: &str, rows: Value) -> Result<Vec<Value>>;

    /// 回傳更新後的資料列
    async fn update(&self, ctx: &RequestContext, query: &Query, patch: Value) -> Result<Vec<Value>>;

    /// 回傳被刪除的資料列
    async fn delete(&self, ctx: &RequestContext, query: &Query) -> Result<Vec<Value>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadOptions {
    pub content_type: String,
    pub cache_control_seconds: u64,
    pub upsert: bool,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// 上傳物件，回傳儲存桶內的路徑
    async fn upload(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        key: &str,
        body: bytes::Bytes,
        options: &UploadOptions,
    ) -> Result<String>;

    fn public_url(&self, bucket: &str, key: &str) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionLimits {
    pub max_size_bytes: usize,
    pub max_dimension: u32,
}

/// 上傳前的圖片壓縮：縮小到限制內的尺寸與檔案大小
///
/// 屬於 CPU 密集工作，呼叫端應放在 blocking 執行緒上執行。
pub trait ImageCompressor: Send + Sync {
    fn compress(&self, upload: Upload, limits: &CompressionLimits) -> Result<Upload>;
}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(SiteError::from))
        .collect()
}

pub async fn fetch_all<T: DeserializeOwned>(
    store: &dyn TableStore,
    ctx: &RequestContext,
    query: &Query,
) -> Result<Vec<T>> {
    decode_rows(store.select(ctx, query).await?)
}

/// 最多一筆；多於一筆視為後端錯誤
pub async fn fetch_maybe_single<T: DeserializeOwned>(
    store: &dyn TableStore,
    ctx: &RequestContext,
    query: &Query,
) -> Result<Option<T>> {
    let query = query.clone().limit(2);
    let mut rows = store.select(ctx, &query).await?;

    match rows.len() {
        0 => Ok(None),
        1 => Ok(Some(serde_json::from_value(rows.remove(0))?)),
        n => Err(SiteError::BackendError {
            status: 406,
            message: format!("Expected at most one row from {}, got {}", query.table, n),
        }),
    }
}

/// 寫入操作回傳的第一筆資料列
pub fn first_row<T: DeserializeOwned>(rows: Vec<Value>, table: &str) -> Result<T> {
    let row = rows.into_iter().next().ok_or_else(|| SiteError::BackendError {
        status: 500,
        message: format!("No row returned from {}", table),
    })?;
    Ok(serde_json::from_value(row)?)
}
