use crate::app::Backend;
use crate::domain::model::{AuthUser, NewReview, Review, ReviewUpdate};
use crate::domain::ports::{fetch_all, fetch_maybe_single, first_row, RequestContext};
use crate::domain::query::Query;
use crate::domain::rating::STAR_SEGMENTS;
use crate::utils::error::{Result, SiteError};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

const REVIEWS_TABLE: &str = "reviews";
const LIST_COLUMNS: &str = "*, profiles(username, avatar_url)";

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewForm {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub rating: u8,
}

impl ReviewForm {
    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() || self.rating == 0 {
            return Err(SiteError::validation(
                "Kérlek töltsd ki az összes mezőt, és válassz értékelést!",
            ));
        }
        if self.rating > STAR_SEGMENTS {
            return Err(SiteError::validation(format!(
                "Az értékelés 1 és {} között lehet.",
                STAR_SEGMENTS
            )));
        }
        Ok(())
    }
}

/// 評論列表中的一筆，附帶目前使用者是否可編輯
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub edited: bool,
    pub editable: bool,
}

#[derive(Clone)]
pub struct ReviewService {
    backend: Backend,
}

impl ReviewService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// 最新的評論在前，附上作者的使用者名稱與頭像
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<ReviewView>> {
        let query = Query::table(REVIEWS_TABLE)
            .select(LIST_COLUMNS)
            .order("created_at", false);
        let reviews: Vec<Review> = fetch_all(self.backend.tables.as_ref(), ctx, &query).await?;

        let viewer = self.backend.auth.get_user(ctx).await?.map(|user| user.id);

        Ok(reviews
            .into_iter()
            .map(|review| ReviewView {
                edited: review.was_edited(),
                editable: viewer.as_deref() == Some(review.user_id.as_str()),
                review,
            })
            .collect())
    }

    /// 每位使用者只能有一則評論
    pub async fn create(&self, ctx: &RequestContext, form: &ReviewForm) -> Result<Review> {
        let user = self.require_user(ctx).await?;

        let existing = Query::table(REVIEWS_TABLE)
            .select("id")
            .eq("user_id", &user.id)
            .limit(1);
        if !self.backend.tables.select(ctx, &existing).await?.is_empty() {
            return Err(SiteError::Conflict {
                message: "Már írtál értékelést!".to_string(),
            });
        }

        form.validate()?;

        let new_review = NewReview {
            title: form.title.clone(),
            content: form.content.clone(),
            rating: form.rating,
            user_id: user.id.clone(),
        };
        let rows = self
            .backend
            .tables
            .insert(ctx, REVIEWS_TABLE, serde_json::to_value([&new_review])?)
            .await?;
        let review: Review = first_row(rows, REVIEWS_TABLE)?;

        tracing::info!("⭐ Review {} created by {} ({}/10)", review.id, user.id, review.rating);
        Ok(review)
    }

    pub async fn update(&self, ctx: &RequestContext, id: i64, form: &ReviewForm) -> Result<Review> {
        let user = self.require_user(ctx).await?;
        form.validate()?;
        self.require_owner(ctx, id, &user).await?;

        let update = ReviewUpdate {
            title: form.title.clone(),
            content: form.content.clone(),
            rating: form.rating,
            updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let query = Query::table(REVIEWS_TABLE).eq("id", id);
        let rows = self
            .backend
            .tables
            .update(ctx, &query, serde_json::to_value(&update)?)
            .await?;
        let review: Review = first_row(rows, REVIEWS_TABLE)?;

        tracing::info!("⭐ Review {} updated", review.id);
        Ok(review)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<()> {
        let user = self.require_user(ctx).await?;
        self.require_owner(ctx, id, &user).await?;

        let query = Query::table(REVIEWS_TABLE).eq("id", id);
        self.backend.tables.delete(ctx, &query).await?;

        tracing::info!("🗑️ Review {} deleted by {}", id, user.id);
        Ok(())
    }

    async fn require_user(&self, ctx: &RequestContext) -> Result<AuthUser> {
        self.backend
            .auth
            .get_user(ctx)
            .await?
            .ok_or(SiteError::Unauthorized)
    }

    async fn require_owner(&self, ctx: &RequestContext, id: i64, user: &AuthUser) -> Result<()> {
        let query = Query::table(REVIEWS_TABLE).eq("id", id);
        let review: Review = fetch_maybe_single(self.backend.tables.as_ref(), ctx, &query)
            .await?
            .ok_or_else(|| SiteError::not_found(format!("értékelés #{}", id)))?;

        if review.user_id != user.id {
            return Err(SiteError::Forbidden {
                message: "Csak a saját értékelésedet módosíthatod!".to_string(),
            });
        }
        Ok(())
    }
}
