use super::{check_response, SupabaseClient};
use crate::domain::ports::{ObjectStorage, RequestContext, UploadOptions};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

#[async_trait]
impl ObjectStorage for SupabaseClient {
    async fn upload(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        key: &str,
        body: bytes::Bytes,
        options: &UploadOptions,
    ) -> Result<String> {
        tracing::debug!("📦 Uploading {} bytes to {}/{}", body.len(), bucket, key);

        let request = self
            .client
            .post(self.endpoint(&format!("/storage/v1/object/{}/{}", bucket, key)))
            .header("Content-Type", &options.content_type)
            .header(
                "Cache-Control",
                format!("max-age={}", options.cache_control_seconds),
            )
            .header("x-upsert", options.upsert.to_string())
            .body(body);
        let response = self.authorize(request, ctx).send().await?;

        let uploaded: UploadResponse = check_response(response).await?.json().await?;
        Ok(uploaded
            .key
            .unwrap_or_else(|| format!("{}/{}", bucket, key)))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        self.endpoint(&format!("/storage/v1/object/public/{}/{}", bucket, key))
    }
}
