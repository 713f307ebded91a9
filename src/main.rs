use clap::Parser;
use tracing_subscriber::EnvFilter;

use a3s_bridge::cli::{Cli, Commands};
use a3s_bridge::config::BridgeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = match &cli.config {
        Some(path) => BridgeConfig::load_from(path)?,
        None => BridgeConfig::load()?,
    };

    match cli.command {
        Commands::Serve { host, port } => {
            a3s_bridge::cli::serve::execute(config, host.as_deref(), port).await?;
        }
        Commands::Config => {
            a3s_bridge::cli::config::execute(&config)?;
        }
    }

    Ok(())
}
