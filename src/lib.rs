pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod utils;
pub mod web;

pub use adapters::{JpegCompressor, SupabaseClient};
pub use app::Backend;
pub use config::{CliConfig, SiteConfig};
pub use utils::error::{Result, SiteError};
pub use web::state::AppState;
