pub mod cli;
pub mod toml_config;

pub use cli::CliConfig;
pub use toml_config::{
    ServerConfig, SessionConfig, SiteConfig, StorageConfig, SupabaseConfig, UploadConfig,
};
