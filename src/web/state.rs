use crate::app::services::{
    AccountService, BlogService, DashboardService, DownloadService, LandingService,
    ProfileService, ReviewService,
};
use crate::app::Backend;
use crate::config::SiteConfig;
use crate::domain::ports::ImageCompressor;
use std::sync::Arc;

pub struct AppState {
    pub accounts: AccountService,
    pub blog: BlogService,
    pub reviews: ReviewService,
    pub landing: LandingService,
    pub profiles: ProfileService,
    pub dashboard: DashboardService,
    pub downloads: DownloadService,
    pub cookie_name: String,
}

impl AppState {
    pub fn new(
        config: &SiteConfig,
        backend: Backend,
        compressor: Arc<dyn ImageCompressor>,
    ) -> Arc<Self> {
        Arc::new(Self {
            accounts: AccountService::new(backend.clone()),
            blog: BlogService::new(backend.tables.clone()),
            reviews: ReviewService::new(backend.clone()),
            landing: LandingService::new(backend.tables.clone()),
            profiles: ProfileService::new(
                backend.clone(),
                compressor,
                config.storage.clone(),
                config.uploads.clone(),
            ),
            dashboard: DashboardService::new(backend.clone()),
            downloads: DownloadService::new(backend, config.storage.clone()),
            cookie_name: config.session.cookie_name.clone(),
        })
    }
}
