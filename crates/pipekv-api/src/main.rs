//! pipekv server binary
//!
//! HTTP service demonstrating pipelined vs sequential bulk key-value
//! operations against Redis.
//!
//! # Usage
//!
//! ```bash
//! # With config file
//! pipekv --config config.yaml
//!
//! # With environment variables only
//! PIPEKV_STORAGE__BACKEND=memory pipekv
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pipekv_api::http::{create_router, AppState};
use pipekv_server::ServerConfig;
use pipekv_storage::{KvStore, MemoryKvStore, RedisKvStore};

/// pipekv - Redis pipelining demonstration service
#[derive(Parser, Debug)]
#[command(name = "pipekv")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = if let Some(config_path) = args.config {
        ServerConfig::load(&config_path)?
    } else {
        ServerConfig::from_env()?
    };

    init_logging(&config.logging.level, config.logging.json)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting pipekv server");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    match config.storage.backend.as_str() {
        "memory" => {
            info!("Using in-memory storage backend");
            let store = Arc::new(MemoryKvStore::new());
            run_http_server(store, addr).await
        }
        "redis" => {
            info!(url = %config.storage.redis_url, "Connecting to Redis");
            let store = RedisKvStore::connect_with_timeouts(
                &config.storage.redis_url,
                Duration::from_secs(config.storage.response_timeout_secs),
                Duration::from_secs(config.storage.connect_timeout_secs),
            )
            .await?;
            info!("Redis connection established");
            run_http_server(Arc::new(store), addr).await
        }
        other => anyhow::bail!("Unknown storage backend: {other}"),
    }
}

/// Initialize logging from config, honoring RUST_LOG when set.
fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

/// Run the HTTP server with graceful shutdown.
async fn run_http_server<S>(store: Arc<S>, addr: SocketAddr) -> anyhow::Result<()>
where
    S: KvStore,
{
    let state = AppState::new(store);
    let router = create_router(state);

    info!(%addr, "HTTP server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
