use super::{check_response, SupabaseClient};
use crate::domain::model::{AuthUser, Session, SignUpOutcome};
use crate::domain::ports::{AuthProvider, RequestContext};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        tracing::debug!("🔐 Signing in {}", email);

        let response = self
            .client
            .post(self.endpoint("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let session: Session = check_response(response).await?.json().await?;
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<SignUpOutcome> {
        tracing::debug!("🔐 Registering {}", email);

        let response = self
            .client
            .post(self.endpoint("/auth/v1/signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;

        let body: Value = check_response(response).await?.json().await?;

        // 開啟信箱確認時，後端只回傳使用者物件
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)?;
            return Ok(SignUpOutcome::SignedIn { session });
        }

        let user_json = body.get("user").cloned().unwrap_or(body);
        let user: AuthUser = serde_json::from_value(user_json)?;
        Ok(SignUpOutcome::ConfirmationPending { user })
    }

    async fn sign_out(&self, ctx: &RequestContext) -> Result<()> {
        if ctx.is_anonymous() {
            return Ok(());
        }

        let request = self.client.post(self.endpoint("/auth/v1/logout"));
        let response = self.authorize(request, ctx).send().await?;

        // 已失效的 token 視同登出成功
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            tracing::debug!("Session already invalid on sign-out");
            return Ok(());
        }

        check_response(response).await?;
        Ok(())
    }

    async fn get_user(&self, ctx: &RequestContext) -> Result<Option<AuthUser>> {
        if ctx.is_anonymous() {
            return Ok(None);
        }

        let request = self.client.get(self.endpoint("/auth/v1/user"));
        let response = self.authorize(request, ctx).send().await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::debug!("Access token rejected by auth service");
            return Ok(None);
        }

        let user: AuthUser = check_response(response).await?.json().await?;
        Ok(Some(user))
    }

    async fn update_password(&self, ctx: &RequestContext, new_password: &str) -> Result<AuthUser> {
        if ctx.is_anonymous() {
            return Err(SiteError::Unauthorized);
        }

        let request = self
            .client
            .put(self.endpoint("/auth/v1/user"))
            .json(&json!({ "password": new_password }));
        let response = self.authorize(request, ctx).send().await?;

        let user: AuthUser = check_response(response).await?.json().await?;
        Ok(user)
    }
}
