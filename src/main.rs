use clap::Parser;
use shopventure::utils::{logger, validation::Validate};
use shopventure::{
    AppState, Backend, CliConfig, JpegCompressor, SiteConfig, SiteError, SupabaseClient,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting shopventure server");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!("❌ Server failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
}

async fn run(cli: &CliConfig) -> Result<(), SiteError> {
    let mut config = SiteConfig::from_file(&cli.config)?;
    cli.apply_overrides(&mut config);

    // 驗證配置
    config.validate()?;
    tracing::info!("📋 Configuration loaded from {}", cli.config);

    let client = SupabaseClient::from_config(&config.supabase)?;
    tracing::info!("🔗 Backend: {}", client.base_url());

    let state = AppState::new(
        &config,
        Backend::supabase(client),
        Arc::new(JpegCompressor),
    );

    shopventure::web::serve(&config, state).await
}
