//! Injury Hub - HTTP API over the aggregated injury content
//!
//! Usage:
//!   injury-hub                          - Serve with defaults and env credentials
//!   injury-hub --config hub.yaml        - Load a JSON/YAML config file
//!   injury-hub --bind 0.0.0.0:8080      - Override the listen address

use anyhow::Context;
use clap::Parser;
use server::{router, AppState};
use shared::{HubConfig, TracingLogger};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "injury-hub")]
#[command(about = "Injury Hub - Aggregated injury, law firm and settlement data")]
#[command(version)]
struct Cli {
    /// Path to a JSON or YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the configured one
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => HubConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => HubConfig::default(),
    };
    config.apply_env();
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let state = AppState::from_config(&config, Arc::new(TracingLogger));
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;

    info!("Injury Hub listening on {}", config.server.bind);
    axum::serve(listener, router(state)).await?;

    Ok(())
}
