//! tagcluster-engine - Tag-based track clustering service
//!
//! Fetches community tags for tracks, clusters them with k-means and labels
//! each cluster with a genre. Serves the pipeline over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagcluster_common::config::load_or_default;
use tagcluster_engine::config::resolve_lastfm_api_key;
use tagcluster_engine::tags::{LastFmClient, TagProvider};
use tagcluster_engine::{build_router, AppState, MatchOptions, TrackMatcher};

/// Command-line arguments for tagcluster-engine
#[derive(Parser, Debug)]
#[command(name = "tagcluster-engine")]
#[command(about = "Tag-based music track clustering service")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "TAGCLUSTER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (overrides config file)
    #[arg(long, env = "TAGCLUSTER_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "TAGCLUSTER_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    config
        .clustering
        .validate()
        .context("Invalid clustering configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tagcluster_engine={},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tagcluster-engine");
    info!(
        "Version: {} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );

    // The service still starts without a key; matching requests then fail
    // with a configuration error.
    let matcher = match resolve_lastfm_api_key(&config) {
        Ok(key) => {
            let client = LastFmClient::new(key).context("Failed to create Last.fm client")?;
            let provider: Arc<dyn TagProvider> = Arc::new(client);
            Some(Arc::new(TrackMatcher::from_config(provider, &config.clustering)))
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    };

    let state = AppState::new(matcher, MatchOptions::from_config(&config.clustering));
    let app = build_router(state);

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
