use crate::app::Backend;
use crate::domain::model::{AuthUser, ProfileSummary, Session, SignUpOutcome};
use crate::domain::ports::{fetch_maybe_single, RequestContext};
use crate::domain::query::Query;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::require_text;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// 導覽列：登入狀態與使用者名稱、頭像
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentUser {
    pub user: AuthUser,
    pub profile: ProfileSummary,
}

#[derive(Clone)]
pub struct AccountService {
    backend: Backend,
}

impl AccountService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<Session> {
        require_text("Email", &form.email)?;
        require_text("Jelszó", &form.password)?;

        let session = self
            .backend
            .auth
            .sign_in_with_password(form.email.trim(), &form.password)
            .await?;

        tracing::info!("🔐 User {} signed in", session.user.id);
        Ok(session)
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<SignUpOutcome> {
        require_text("Email", &form.email)?;
        require_text("Jelszó", &form.password)?;
        require_text("Felhasználónév", &form.username)?;

        let outcome = self
            .backend
            .auth
            .sign_up(
                form.email.trim(),
                &form.password,
                json!({ "username": form.username.trim() }),
            )
            .await?;

        match &outcome {
            SignUpOutcome::SignedIn { session } => {
                tracing::info!("🆕 User {} registered and signed in", session.user.id)
            }
            SignUpOutcome::ConfirmationPending { user } => {
                tracing::info!("🆕 User {} registered, awaiting email confirmation", user.id)
            }
        }

        Ok(outcome)
    }

    pub async fn logout(&self, ctx: &RequestContext) -> Result<()> {
        self.backend.auth.sign_out(ctx).await
    }

    /// 取得已登入的使用者，未登入時回傳 `Unauthorized`
    pub async fn require_user(&self, ctx: &RequestContext) -> Result<AuthUser> {
        self.backend
            .auth
            .get_user(ctx)
            .await?
            .ok_or(SiteError::Unauthorized)
    }

    pub async fn current_user(&self, ctx: &RequestContext) -> Result<Option<CurrentUser>> {
        let Some(user) = self.backend.auth.get_user(ctx).await? else {
            return Ok(None);
        };

        let query = Query::table("profiles")
            .select("username, avatar_url")
            .eq("id", &user.id);

        let tables = self.backend.tables.as_ref();
        let profile = match fetch_maybe_single::<ProfileSummary>(tables, ctx, &query).await? {
            Some(profile) => profile,
            None => {
                tracing::warn!("No profile row for user {}", user.id);
                ProfileSummary::default()
            }
        };

        Ok(Some(CurrentUser { user, profile }))
    }
}
