use crate::utils::error::SiteError;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

impl SiteError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SiteError::Unauthorized => StatusCode::UNAUTHORIZED,
            SiteError::Forbidden { .. } => StatusCode::FORBIDDEN,
            SiteError::NotFound { .. } => StatusCode::NOT_FOUND,
            SiteError::Conflict { .. } => StatusCode::CONFLICT,
            SiteError::ValidationError { .. } | SiteError::UploadError { .. } => {
                StatusCode::BAD_REQUEST
            }
            SiteError::BackendError { status, .. } if (400..500).contains(status) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            SiteError::BackendError { .. } | SiteError::ApiError(_) => StatusCode::BAD_GATEWAY,
            SiteError::IoError(_)
            | SiteError::SerializationError(_)
            | SiteError::ConfigError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::MissingConfigError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for SiteError {
    fn from(rejection: JsonRejection) -> Self {
        SiteError::validation(format!("Hibás kérés: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for SiteError {
    fn from(rejection: PathRejection) -> Self {
        SiteError::validation(format!("Hibás cím: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for SiteError {
    fn from(rejection: MultipartRejection) -> Self {
        SiteError::UploadError {
            message: format!("Hibás feltöltés: {}", rejection.body_text()),
        }
    }
}

impl From<MultipartError> for SiteError {
    fn from(e: MultipartError) -> Self {
        SiteError::UploadError {
            message: format!("Hibás feltöltés: {}", e.body_text()),
        }
    }
}

/// 錯誤一律記錄，回應只帶橫幅訊息
impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_client_error() {
            tracing::warn!("⚠️ Request rejected ({}): {}", status, self);
        } else {
            tracing::error!("❌ Request failed ({}): {}", status, self);
        }

        (status, Json(json!({ "error": self.user_friendly_message() }))).into_response()
    }
}
