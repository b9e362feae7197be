use crate::domain::model::RatingRow;
use crate::domain::ports::{fetch_all, RequestContext, TableStore};
use crate::domain::query::Query;
use crate::domain::rating::RatingSummary;
use crate::utils::error::Result;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandingPage {
    pub rating: RatingSummary,
}

#[derive(Clone)]
pub struct LandingService {
    tables: Arc<dyn TableStore>,
}

impl LandingService {
    pub fn new(tables: Arc<dyn TableStore>) -> Self {
        Self { tables }
    }

    pub async fn page(&self, ctx: &RequestContext) -> Result<LandingPage> {
        let query = Query::table("reviews").select("rating");
        let rows: Vec<RatingRow> = fetch_all(self.tables.as_ref(), ctx, &query).await?;
        let ratings: Vec<f64> = rows.iter().map(|row| row.rating).collect();

        Ok(LandingPage {
            rating: RatingSummary::from_ratings(&ratings),
        })
    }
}
