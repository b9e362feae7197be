// Application layer: one service per page, each issuing the page's remote calls.

pub mod services;

use crate::adapters::SupabaseClient;
use crate::domain::ports::{AuthProvider, ObjectStorage, TableStore};
use std::sync::Arc;

/// 後端服務的三個介面
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthProvider>,
    pub tables: Arc<dyn TableStore>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl Backend {
    pub fn supabase(client: SupabaseClient) -> Self {
        let client = Arc::new(client);
        Self {
            auth: client.clone(),
            tables: client.clone(),
            storage: client,
        }
    }
}
