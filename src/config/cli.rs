use crate::config::SiteConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "shopventure")]
#[command(about = "Shopventure website backend")]
pub struct CliConfig {
    #[arg(long, short, default_value = "shopventure.toml")]
    pub config: String,

    #[arg(long, help = "Override server.host")]
    pub host: Option<String>,

    #[arg(long, help = "Override server.port")]
    pub port: Option<u16>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 命令列參數優先於設定檔
    pub fn apply_overrides(&self, config: &mut SiteConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
