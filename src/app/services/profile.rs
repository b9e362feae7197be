use crate::app::Backend;
use crate::config::{StorageConfig, UploadConfig};
use crate::domain::badges::{badge_icons, BadgeIcon};
use crate::domain::filename::unique_object_key;
use crate::domain::model::{AuthUser, Profile, ProfileSettings, Upload};
use crate::domain::ports::{fetch_maybe_single, ImageCompressor, RequestContext, UploadOptions};
use crate::domain::query::Query;
use crate::utils::error::{Result, SiteError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const PROFILES_TABLE: &str = "profiles";
const SETTINGS_COLUMNS: &str = "username, avatar_url, bio, cover_image";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicProfile {
    #[serde(flatten)]
    pub profile: Profile,
    pub badge_icons: Vec<BadgeIcon>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Avatar,
    Cover,
}

#[derive(Clone)]
pub struct ProfileService {
    backend: Backend,
    compressor: Arc<dyn ImageCompressor>,
    storage: StorageConfig,
    uploads: UploadConfig,
}

impl ProfileService {
    pub fn new(
        backend: Backend,
        compressor: Arc<dyn ImageCompressor>,
        storage: StorageConfig,
        uploads: UploadConfig,
    ) -> Self {
        Self {
            backend,
            compressor,
            storage,
            uploads,
        }
    }

    pub async fn public_profile(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<PublicProfile> {
        let query = Query::table(PROFILES_TABLE).eq("username", username);
        let profile: Profile = fetch_maybe_single(self.backend.tables.as_ref(), ctx, &query)
            .await?
            .ok_or_else(|| SiteError::not_found(format!("profil ({})", username)))?;

        let badge_icons = badge_icons(profile.badges.as_ref());
        Ok(PublicProfile {
            profile,
            badge_icons,
        })
    }

    /// 尚未建立 profile 時回傳空白設定
    pub async fn settings(&self, ctx: &RequestContext) -> Result<ProfileSettings> {
        let user = self.require_user(ctx).await?;
        let query = Query::table(PROFILES_TABLE)
            .select(SETTINGS_COLUMNS)
            .eq("id", &user.id);

        match fetch_maybe_single(self.backend.tables.as_ref(), ctx, &query).await? {
            Some(settings) => Ok(settings),
            None => {
                tracing::info!("No profile found for user {}", user.id);
                Ok(ProfileSettings::default())
            }
        }
    }

    pub async fn update_settings(
        &self,
        ctx: &RequestContext,
        settings: &ProfileSettings,
    ) -> Result<()> {
        let user = self.require_user(ctx).await?;
        let query = Query::table(PROFILES_TABLE).eq("id", &user.id);

        let patch = json!({
            "username": settings.username,
            "avatar_url": settings.avatar_url,
            "cover_image": settings.cover_image,
            "bio": settings.bio,
        });
        self.backend.tables.update(ctx, &query, patch).await?;

        tracing::info!("👤 Profile of {} updated", user.id);
        Ok(())
    }

    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        change: &PasswordChange,
    ) -> Result<()> {
        if change.new_password != change.confirm_password {
            return Err(SiteError::validation("A jelszavak nem egyeznek!"));
        }
        if change.new_password.is_empty() {
            return Err(SiteError::validation("Az új jelszó nem lehet üres!"));
        }

        let user = self
            .backend
            .auth
            .update_password(ctx, &change.new_password)
            .await?;

        tracing::info!("🔑 Password changed for {}", user.id);
        Ok(())
    }

    /// 壓縮並上傳圖片，回傳公開網址；寫回 profile 由設定頁的更新完成
    pub async fn upload_image(
        &self,
        ctx: &RequestContext,
        kind: ImageKind,
        upload: Upload,
    ) -> Result<String> {
        self.require_user(ctx).await?;

        let bucket = match kind {
            ImageKind::Avatar => &self.storage.avatar_bucket,
            ImageKind::Cover => &self.storage.cover_bucket,
        };

        let compressor = Arc::clone(&self.compressor);
        let limits = self.uploads.limits();
        let compressed = tokio::task::spawn_blocking(move || compressor.compress(upload, &limits))
            .await
            .map_err(|e| SiteError::UploadError {
                message: format!("A kép feldolgozása megszakadt: {}", e),
            })??;

        let key = unique_object_key(&compressed.file_name, Utc::now().timestamp_millis());
        let options = UploadOptions {
            content_type: compressed.content_type.clone(),
            cache_control_seconds: self.uploads.cache_control_seconds,
            upsert: false,
        };

        self.backend
            .storage
            .upload(ctx, bucket, &key, compressed.bytes, &options)
            .await?;

        let url = self.backend.storage.public_url(bucket, &key);
        tracing::info!("🖼️ Uploaded {:?} image to {}", kind, url);
        Ok(url)
    }

    async fn require_user(&self, ctx: &RequestContext) -> Result<AuthUser> {
        self.backend
            .auth
            .get_user(ctx)
            .await?
            .ok_or(SiteError::Unauthorized)
    }
}
