use anyhow::Result;
use clap::Parser;
use todolap_pos::{
    cli::{Args, CliApp},
    utils::Config,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_env()
        .and_then(|config| config.with_overrides(args.catalog.clone(), args.outbox.clone()))
        .map_err(|e| {
            eprintln!("Failed to load configuration: {}", e);
            e
        })?;

    let level = if args.verbose { "debug" } else { config.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("🧾 TodoLap POS starting...");
    tracing::info!(
        "Configuration loaded for {} environment",
        config.environment
    );

    let app = CliApp::new(config, args.yes).await.map_err(|e| {
        tracing::error!("Failed to start register: {:#}", e);
        e
    })?;

    app.run(args.command).await?;

    tracing::info!("🧾 TodoLap POS stopped");
    Ok(())
}
