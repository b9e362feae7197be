// HTTP surface: JSON endpoints backing each page of the site.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod session;
pub mod state;

use crate::config::SiteConfig;
use crate::utils::error::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// multipart 封包除了檔案本身還有欄位標頭
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn router(state: Arc<AppState>, config: &SiteConfig) -> Router {
    let body_limit = config.uploads.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/landing", get(handlers::landing))
        .route("/api/blog", get(handlers::list_blog).post(handlers::create_blog))
        .route("/api/blog/{slug}", get(handlers::blog_detail))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/me", get(handlers::me))
        .route(
            "/api/reviews",
            get(handlers::list_reviews).post(handlers::create_review),
        )
        .route(
            "/api/reviews/{id}",
            put(handlers::update_review).delete(handlers::delete_review),
        )
        .route("/api/profile/{username}", get(handlers::public_profile))
        .route("/api/account", get(handlers::account))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .route("/api/settings/password", post(handlers::change_password))
        .route("/api/settings/avatar", post(handlers::upload_avatar))
        .route("/api/settings/cover", post(handlers::upload_cover))
        .route("/api/download", get(handlers::download))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&config.server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 未設定來源時允許任何來源，但不帶憑證
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️ Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins).allow_credentials(true)
    }
}

pub async fn serve(config: &SiteConfig, state: Arc<AppState>) -> Result<()> {
    let app = router(state, config);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("🚀 Server running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("❌ Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("❌ Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
