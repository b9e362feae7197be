use crate::app::Backend;
use crate::config::StorageConfig;
use crate::domain::ports::RequestContext;
use crate::utils::error::Result;
use serde::Serialize;

/// 下載頁：只有登入的使用者能取得遊戲檔連結
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadLink {
    Available { url: String, file_name: String },
    LoginRequired,
}

#[derive(Clone)]
pub struct DownloadService {
    backend: Backend,
    storage: StorageConfig,
}

impl DownloadService {
    pub fn new(backend: Backend, storage: StorageConfig) -> Self {
        Self { backend, storage }
    }

    pub async fn link(&self, ctx: &RequestContext) -> Result<DownloadLink> {
        if self.backend.auth.get_user(ctx).await?.is_none() {
            return Ok(DownloadLink::LoginRequired);
        }

        let url = self
            .backend
            .storage
            .public_url(&self.storage.game_bucket, &self.storage.game_object);
        Ok(DownloadLink::Available {
            url,
            file_name: self.storage.game_object.clone(),
        })
    }
}
