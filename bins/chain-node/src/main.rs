//! chain-node: HTTP front end for the chain/mempool engine core.
//!
//! Wires the persistence contract (C5, RocksDB-backed), the chain/mempool
//! engine (C6/C7), and the REST surface together behind a single `axum`
//! server: parse config, open the store, start the server, wait for
//! Ctrl+C.

mod config;
mod dto;
mod error;
mod reassemble;
mod routes;

use std::process;
use std::sync::Arc;

use chain_store::{ChainStore, RocksStore};
use config::NodeConfig;
use tracing::{error, info};

/// Shared application state passed to every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ChainStore>,
    pub engine_config: chain_engine::EngineConfig,
    /// Wall-clock seconds, used as the mempool's script-evaluation
    /// timestamp (block acceptance uses the submitted block's own
    /// timestamp instead). Indirected through a closure so tests can pin it.
    pub now: Arc<dyn Fn() -> i64 + Send + Sync>,
}

#[tokio::main]
async fn main() {
    let config = match NodeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            process::exit(1);
        }
    };

    init_logging(&config.log_level, &config.log_format);

    info!("chain-node starting");
    info!(bits = format!("{:#010x}", config.blockchain_bits), subsidy = config.blockchain_subsidy, "consensus parameters");
    info!(store_path = %config.store_path.display(), "store path");

    let Some(engine_config) = config.engine_config() else {
        error!(
            bits = format!("{:#010x}", config.blockchain_bits),
            "BLOCKCHAIN_BITS is stricter than the allowed floor"
        );
        process::exit(1);
    };

    if let Err(e) = std::fs::create_dir_all(&config.store_path) {
        error!(error = %e, "failed to create store directory");
        process::exit(1);
    }

    let store = match RocksStore::open(&config.store_path) {
        Ok(store) => Arc::new(store) as Arc<dyn ChainStore>,
        Err(e) => {
            error!(error = %e, "failed to open store");
            process::exit(1);
        }
    };

    let state = AppState { store, engine_config, now: Arc::new(now_unix) };
    let app = routes::router(state);

    let listener = match tokio::net::TcpListener::bind(&config.rpc_addr()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %config.rpc_addr(), "failed to bind");
            process::exit(1);
        }
    };
    info!("listening on http://{}", config.rpc_addr());

    let shutdown = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        error!(error = %e, "server exited with error");
        process::exit(1);
    }
    info!("chain-node shutdown complete");
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Initialize the tracing subscriber with the given log level and output
/// format. Pass `format = "json"` for structured JSON output, matching the
/// teacher's `rill-node` binary; any other value defaults to human-readable
/// text.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry().with(filter).with(fmt::layer().json()).init();
    } else {
        tracing_subscriber::registry().with(filter).with(fmt::layer().with_target(true).with_level(true)).init();
    }
}
