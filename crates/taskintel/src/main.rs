//! Service entry point.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use taskintel::gateway::{AppState, build_router};
use taskintel::source::{HttpCollectionSource, SourceClient};
use taskintel_core::IntelConfig;
use taskintel_core::roster::Roster;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "taskintel", about = "Task intelligence bot for chat commands")]
struct Cli {
    /// Bind address (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config and PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = IntelConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if config.source.api_token.is_none() {
        warn!("No task-source token configured; every query will report no data");
    }
    if config.gateway.signing_secret.is_none() {
        warn!("No signing secret configured; inbound commands will NOT be verified");
    }
    let configured = config.configured_departments();
    info!(
        departments = configured.len(),
        names = ?configured.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
        "Configured department collections"
    );

    let config = Arc::new(config);
    let client = SourceClient::new(&config.source)?;
    let roster = Roster::new(
        config.roster.people.clone(),
        config.roster.user_ids.clone(),
    );
    let source = Arc::new(HttpCollectionSource::new(
        client,
        roster,
        Duration::from_secs(config.source.timeout_secs),
    ));

    let state = AppState::new(config.clone(), source)?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "Task intelligence bot listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
