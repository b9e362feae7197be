use super::{check_response, SupabaseClient};
use crate::domain::ports::{RequestContext, TableStore};
use crate::domain::query::Query;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

const RETURN_REPRESENTATION: &str = "return=representation";

impl SupabaseClient {
    fn table_url(&self, table: &str) -> String {
        self.endpoint(&format!("/rest/v1/{}", table))
    }
}

#[async_trait]
impl TableStore for SupabaseClient {
    async fn select(&self, ctx: &RequestContext, query: &Query) -> Result<Vec<Value>> {
        tracing::debug!("📡 SELECT {} {:?}", query.table, query.read_params());

        let request = self
            .client
            .get(self.table_url(&query.table))
            .query(&query.read_params());
        let response = self.authorize(request, ctx).send().await?;

        let rows: Vec<Value> = check_response(response).await?.json().await?;
        tracing::debug!("📡 {} rows from {}", rows.len(), query.table);
        Ok(rows)
    }

    async fn insert(&self, ctx: &RequestContext, table: &str, rows: Value) -> Result<Vec<Value>> {
        tracing::debug!("📡 INSERT {}", table);

        let request = self
            .client
            .post(self.table_url(table))
            .query(&[("select", "*")])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&rows);
        let response = self.authorize(request, ctx).send().await?;

        Ok(check_response(response).await?.json().await?)
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>> {
        tracing::debug!("📡 UPDATE {} {:?}", query.table, query.filter_params());

        let request = self
            .client
            .patch(self.table_url(&query.table))
            .query(&query.filter_params())
            .query(&[("select", "*")])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch);
        let response = self.authorize(request, ctx).send().await?;

        Ok(check_response(response).await?.json().await?)
    }

    async fn delete(&self, ctx: &RequestContext, query: &Query) -> Result<Vec<Value>> {
        tracing::debug!("📡 DELETE {} {:?}", query.table, query.filter_params());

        let request = self
            .client
            .delete(self.table_url(&query.table))
            .query(&query.filter_params())
            .header("Prefer", RETURN_REPRESENTATION);
        let response = self.authorize(request, ctx).send().await?;

        Ok(check_response(response).await?.json().await?)
    }
}
