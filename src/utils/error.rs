use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Backend error ({status}): {message}")]
    BackendError { status: u16, message: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Upload error: {message}")]
    UploadError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },
}

impl SiteError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// 頁面橫幅上顯示的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::ApiError(_) => "A szolgáltatás jelenleg nem érhető el.".to_string(),
            SiteError::BackendError { message, .. } => message.clone(),
            SiteError::Unauthorized => "Be kell jelentkezned!".to_string(),
            SiteError::NotFound { what } => format!("Nem található: {}", what),
            SiteError::Conflict { message }
            | SiteError::Forbidden { message }
            | SiteError::ValidationError { message }
            | SiteError::UploadError { message } => message.clone(),
            SiteError::IoError(_)
            | SiteError::SerializationError(_)
            | SiteError::ConfigError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::MissingConfigError { .. } => "Váratlan hiba történt.".to_string(),
        }
    }

    /// 是否屬於使用者輸入造成的錯誤（不需要以 error 等級記錄）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SiteError::Unauthorized
                | SiteError::Forbidden { .. }
                | SiteError::NotFound { .. }
                | SiteError::Conflict { .. }
                | SiteError::ValidationError { .. }
                | SiteError::UploadError { .. }
        ) || matches!(self, SiteError::BackendError { status, .. } if (400..500).contains(status))
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
