use crate::app::services::account::{CurrentUser, LoginForm, RegisterForm};
use crate::app::services::blog::{BlogEntry, BlogForm};
use crate::app::services::dashboard::AccountOverview;
use crate::app::services::download::DownloadLink;
use crate::app::services::landing::LandingPage;
use crate::app::services::profile::{ImageKind, PasswordChange, PublicProfile};
use crate::app::services::reviews::{ReviewForm, ReviewView};
use crate::domain::model::{ProfileSettings, Review, Session, SignUpOutcome, Upload};
use crate::utils::error::{Result, SiteError};
use crate::web::extract::{ApiJson, ApiPath};
use crate::web::session::{clear_cookie, session_cookie, Caller};
use crate::web::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

type AppStateRef = State<Arc<AppState>>;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn landing(
    State(state): AppStateRef,
    Caller(ctx): Caller,
) -> Result<Json<LandingPage>> {
    Ok(Json(state.landing.page(&ctx).await?))
}

pub async fn list_blog(
    State(state): AppStateRef,
    Caller(ctx): Caller,
) -> Result<Json<Vec<BlogEntry>>> {
    Ok(Json(state.blog.list(&ctx).await?))
}

pub async fn blog_detail(
    State(state): AppStateRef,
    Caller(ctx): Caller,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<BlogEntry>> {
    Ok(Json(state.blog.find_by_slug(&ctx, &slug).await?))
}

pub async fn create_blog(
    State(state): AppStateRef,
    Caller(ctx): Caller,
    ApiJson(form): ApiJson<BlogForm>,
) -> Result<impl IntoResponse> {
    let entry = state.blog.create(&ctx, &form).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn login(
    State(state): AppStateRef,
    ApiJson(form): ApiJson<LoginForm>,
) -> Result<Response> {
    let session = state.accounts.login(&form).await?;
    Ok(with_session_cookie(&state, &session, StatusCode::OK, Json(&session)))
}

pub async fn register(
    State(state): AppStateRef,
    ApiJson(form): ApiJson<RegisterForm>,
) -> Result<Response> {
    let outcome = state.accounts.register(&form).await?;
    let response = match &outcome {
        SignUpOutcome::SignedIn { session } => {
            with_session_cookie(&state, session, StatusCode::CREATED, Json(&outcome))
        }
        SignUpOutcome::ConfirmationPending { .. } => {
            (StatusCode::ACCEPTED, Json(&outcome)).into_response()
        }
    };
    Ok(response)
}

pub async fn logout(State(state): AppStateRef, Caller(ctx): Caller) -> Result<Response> {
    state.accounts.logout(&ctx).await?;

    let mut response = StatusCode::NO_CONTENT.into_response();
    if let Some(cookie) = clear_cookie(&state.cookie_name) {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    Ok(response)
}

pub async fn me(
    State(state): AppStateRef,
    Caller(ctx): Caller,
) -> Result<Json<Option<CurrentUser>>> {
    Ok(Json(state.accounts.current_user(&ctx).await?))
}

pub async fn list_reviews(
    State(state): AppStateRef,
    Caller(ctx): Caller,
) -> Result<Json<Vec<ReviewView>>> {
    Ok(Json(state.reviews.list(&ctx).await?))
}

pub async fn create_review(
    State(state): AppStateRef,
    Caller(ctx): Caller,
    ApiJson(form): ApiJson<ReviewForm>,
) -> Result<impl IntoResponse> {
    let review = state.reviews.create(&ctx, &form).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn update_review(
    State(state): AppStateRef,
    Caller(ctx): Caller,
    ApiPath(id): ApiPath<i64>,
    ApiJson(form): ApiJson<ReviewForm>,
) -> Result<Json<Review>> {
    Ok(Json(state.reviews.update(&ctx, id, &form).await?))
}

pub async fn delete_review(
    State(state): AppStateRef,
    Caller(ctx): Caller,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode> {
    state.reviews.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn public_profile(
    State(state): AppStateRef,
    Caller(ctx): Caller,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<PublicProfile>> {
    Ok(Json(state.profiles.public_profile(&ctx, &username).await?))
}

pub async fn account(
    State(state): AppStateRef,
    Caller(ctx): Caller,
) -> Result<Json<AccountOverview>> {
    Ok(Json(state.dashboard.overview(&ctx).await?))
}

pub async fn get_settings(
    State(state): AppStateRef,
    Caller(ctx): Caller,
) -> Result<Json<ProfileSettings>> {
    Ok(Json(state.profiles.settings(&ctx).await?))
}

pub async fn update_settings(
    State(state): AppStateRef,
    Caller(ctx): Caller,
    ApiJson(settings): ApiJson<ProfileSettings>,
) -> Result<Json<serde_json::Value>> {
    state.profiles.update_settings(&ctx, &settings).await?;
    Ok(Json(json!({ "message": "Profilodat sikeresen frissítetted!" })))
}

pub async fn change_password(
    State(state): AppStateRef,
    Caller(ctx): Caller,
    ApiJson(change): ApiJson<PasswordChange>,
) -> Result<Json<serde_json::Value>> {
    state.profiles.change_password(&ctx, &change).await?;
    Ok(Json(json!({ "message": "Jelszó sikeresen megváltoztatva!" })))
}

pub async fn upload_avatar(
    State(state): AppStateRef,
    Caller(ctx): Caller,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>> {
    upload_image(&state, &ctx, ImageKind::Avatar, multipart?).await
}

pub async fn upload_cover(
    State(state): AppStateRef,
    Caller(ctx): Caller,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>> {
    upload_image(&state, &ctx, ImageKind::Cover, multipart?).await
}

pub async fn download(
    State(state): AppStateRef,
    Caller(ctx): Caller,
) -> Result<Json<DownloadLink>> {
    Ok(Json(state.downloads.link(&ctx).await?))
}

async fn upload_image(
    state: &AppState,
    ctx: &crate::domain::ports::RequestContext,
    kind: ImageKind,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let upload = read_file_field(multipart).await?;
    let url = state.profiles.upload_image(ctx, kind, upload).await?;
    Ok(Json(json!({ "url": url })))
}

/// 讀取 multipart 中第一個帶檔名的欄位，其他欄位略過
async fn read_file_field(mut multipart: Multipart) -> Result<Upload> {
    while let Some(field) = multipart.next_field().await? {
        let file_name = field.file_name().filter(|name| !name.is_empty());
        let Some(file_name) = file_name.map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;

        return Ok(Upload {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(SiteError::UploadError {
        message: "Nincs kiválasztott fájl.".to_string(),
    })
}

fn with_session_cookie(
    state: &AppState,
    session: &Session,
    status: StatusCode,
    body: impl IntoResponse,
) -> Response {
    let mut response = (status, body).into_response();
    if let Some(cookie) = session_cookie(&state.cookie_name, session) {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}
