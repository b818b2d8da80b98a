use caffy_beans::utils::{logger, validation::Validate};
use caffy_beans::{app, open_store, BeanCatalog, CliArgs, ServiceConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 載入 TOML 配置
    let mut config = match ServiceConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if let Some(address) = &args.address {
        config.application.address = address.clone();
    }

    // 初始化日誌
    logger::init_logger(&config.logging.level, config.logging.format, args.verbose);

    tracing::info!("🚀 Starting caffy-beans");
    tracing::info!("📁 Configuration loaded from: {}", args.config);
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let address = config.listen_address()?;
    let store = open_store(&config.database).await?;
    let catalog = BeanCatalog::new(store.clone());

    let result = app::serve(address, catalog, app::shutdown_signal()).await;

    // 關閉資料庫連線
    if let Err(e) = store.close().await {
        tracing::warn!("Failed to close document store: {}", e);
    }

    if let Err(e) = result {
        tracing::error!("❌ Server failed: {}", e);
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    tracing::info!("✅ Shutdown complete");
    Ok(())
}
