//! Recs Express: online, offline, and blended recommendation service.
//!
//! Loads the snapshot tables, wires the stores into the composer, and serves
//! the REST API until Ctrl-C.

use clap::Parser;
use recs_api::ApiServer;
use recs_core::config::AppConfig;
use recs_events::EventStore;
use recs_personalization::{Composer, OfflineStore, SimilarityStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "recs-service")]
#[command(about = "Online, offline, and blended recommendation service")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "RECS_EXPRESS__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "RECS_EXPRESS__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Directory holding similar.jsonl, recommendations.jsonl and top_popular.jsonl
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Per-user event history size (overrides config)
    #[arg(long, env = "RECS_EXPRESS__EVENTS__MAX_HISTORY")]
    max_history: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "recs_service=info,recs_api=info,recs_personalization=info,tower_http=info".into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Recs Express starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(dir) = cli.data_dir {
        config.snapshots.rebase(&dir);
    }
    if let Some(max_history) = cli.max_history {
        config.events.max_history = max_history;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        max_history = config.events.max_history,
        "Configuration loaded"
    );

    // Snapshot tables are required; a malformed table aborts startup.
    let similarity = Arc::new(SimilarityStore::load(&config.snapshots.similar_path)?);
    let offline = Arc::new(OfflineStore::load(
        &config.snapshots.personal_path,
        &config.snapshots.popular_path,
    )?);
    let events = Arc::new(EventStore::new(config.events.max_history));

    let composer = Arc::new(Composer::new(
        events,
        similarity,
        offline.clone(),
        config.composer.upstream_timeout(),
        config.composer.default_num_events,
    ));

    let api_server = ApiServer::new(config.clone(), composer);

    if let Err(e) = api_server.start_metrics() {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Recs Express is ready to serve traffic");

    api_server.start_http(shutdown_signal()).await?;

    offline.log_stats();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
