use crate::app::Backend;
use crate::domain::model::Record;
use crate::domain::ports::{fetch_all, RequestContext};
use crate::domain::query::Query;
use crate::utils::error::{Result, SiteError};
use serde::Serialize;

/// 帳戶頁的遊戲資料，全部以 `user_id` 篩選
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountOverview {
    pub profiles: Vec<Record>,
    pub inventory: Vec<Record>,
    pub rankings: Vec<Record>,
    pub statistics: Vec<Record>,
    pub stores: Vec<Record>,
    pub transactions: Vec<Record>,
}

#[derive(Clone)]
pub struct DashboardService {
    backend: Backend,
}

impl DashboardService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// 依序讀取；任何一個資料表失敗即中止
    pub async fn overview(&self, ctx: &RequestContext) -> Result<AccountOverview> {
        let user = self
            .backend
            .auth
            .get_user(ctx)
            .await?
            .ok_or(SiteError::Unauthorized)?;

        let overview = AccountOverview {
            profiles: self.rows_of(ctx, "profiles", &user.id).await?,
            inventory: self.rows_of(ctx, "inventory", &user.id).await?,
            rankings: self.rows_of(ctx, "rankings", &user.id).await?,
            statistics: self.rows_of(ctx, "statistics", &user.id).await?,
            stores: self.rows_of(ctx, "stores", &user.id).await?,
            transactions: self.rows_of(ctx, "transactions", &user.id).await?,
        };

        tracing::debug!(
            "📊 Account overview for {}: {} inventory items, {} stores, {} transactions",
            user.id,
            overview.inventory.len(),
            overview.stores.len(),
            overview.transactions.len()
        );
        Ok(overview)
    }

    async fn rows_of(
        &self,
        ctx: &RequestContext,
        table: &str,
        user_id: &str,
    ) -> Result<Vec<Record>> {
        let query = Query::table(table).eq("user_id", user_id);
        fetch_all(self.backend.tables.as_ref(), ctx, &query).await
    }
}
