use crate::domain::ports::CompressionLimits;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// 空陣列代表允許任何來源
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_avatar_bucket")]
    pub avatar_bucket: String,
    #[serde(default = "default_cover_bucket")]
    pub cover_bucket: String,
    #[serde(default = "default_game_bucket")]
    pub game_bucket: String,
    #[serde(default = "default_game_object")]
    pub game_object: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// 原始上傳檔案的上限（壓縮前）
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// 壓縮目標大小
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: usize,
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    #[serde(default = "default_cache_control_seconds")]
    pub cache_control_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_avatar_bucket() -> String {
    "profile_pic".to_string()
}

fn default_cover_bucket() -> String {
    "cover_pic".to_string()
}

fn default_game_bucket() -> String {
    "game".to_string()
}

fn default_game_object() -> String {
    "shopventure.rar".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_size_bytes() -> usize {
    512 * 1024
}

fn default_max_dimension() -> u32 {
    800
}

fn default_cache_control_seconds() -> u64 {
    3600
}

fn default_cookie_name() -> String {
    "sv-access-token".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            avatar_bucket: default_avatar_bucket(),
            cover_bucket: default_cover_bucket(),
            game_bucket: default_game_bucket(),
            game_object: default_game_object(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            max_size_bytes: default_max_size_bytes(),
            max_dimension: default_max_dimension(),
            cache_control_seconds: default_cache_control_seconds(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
        }
    }
}

impl UploadConfig {
    pub fn limits(&self) -> CompressionLimits {
        CompressionLimits {
            max_size_bytes: self.max_size_bytes,
            max_dimension: self.max_dimension,
        }
    }
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_ANON_KEY})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("supabase.url", &self.supabase.url)?;
        validation::validate_non_empty_string("supabase.anon_key", &self.supabase.anon_key)?;

        if self.supabase.anon_key.contains("${") {
            return Err(SiteError::MissingConfigError {
                field: "supabase.anon_key".to_string(),
            });
        }

        validation::validate_range(
            "supabase.timeout_seconds",
            self.supabase.timeout_seconds,
            1,
            300,
        )?;
        validation::validate_non_empty_string("server.host", &self.server.host)?;

        validation::validate_bucket_name("storage.avatar_bucket", &self.storage.avatar_bucket)?;
        validation::validate_bucket_name("storage.cover_bucket", &self.storage.cover_bucket)?;
        validation::validate_bucket_name("storage.game_bucket", &self.storage.game_bucket)?;
        validation::validate_non_empty_string("storage.game_object", &self.storage.game_object)?;

        validation::validate_positive_number(
            "uploads.max_size_bytes",
            self.uploads.max_size_bytes,
            1,
        )?;
        if self.uploads.max_upload_bytes < self.uploads.max_size_bytes {
            return Err(SiteError::InvalidConfigValueError {
                field: "uploads.max_upload_bytes".to_string(),
                value: self.uploads.max_upload_bytes.to_string(),
                reason: "Must not be smaller than uploads.max_size_bytes".to_string(),
            });
        }
        validation::validate_positive_number(
            "uploads.max_dimension",
            self.uploads.max_dimension as usize,
            1,
        )?;

        validation::validate_non_empty_string("session.cookie_name", &self.session.cookie_name)?;

        for origin in &self.server.cors_origins {
            validation::validate_url("server.cors_origins", origin)?;
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }
}
