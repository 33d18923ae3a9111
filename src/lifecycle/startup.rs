//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Build the shared safety gate and traffic watch bus
//! - Bind the main and admin listeners and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::admin::{setup_admin_router, AdminState};
use crate::cluster::NodeInfo;
use crate::config::{load_config, ConfigError, ConfigWatcher, ServerConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};
use crate::routing::builtin_routes;
use crate::safety::SafetyGate;
use crate::traffic_watch::TrafficWatchBus;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load configuration from `path`, or fall back to defaults.
pub fn load(path: Option<&Path>) -> Result<ServerConfig, StartupError> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(ServerConfig::default()),
    }
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Run the server until SIGINT/SIGTERM.
pub async fn run(config: ServerConfig, config_path: Option<PathBuf>) -> Result<(), StartupError> {
    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "docdb-frontdoor starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server_id = config.node.server_id.unwrap_or_else(Uuid::new_v4);
    let node = NodeInfo::local(&config.node, server_id);
    tracing::info!(node_tag = %node.node_tag, server_id = %server_id, "Node identity resolved");

    let gate = Arc::new(SafetyGate::new(&config.security));
    let traffic_watch = Arc::new(TrafficWatchBus::new(config.traffic_watch.queue_capacity));
    let shutdown = Arc::new(Shutdown::new());

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match &config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (Some(handle), updates),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload disabled");
                    (None, updates)
                }
            }
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    if config.admin.enabled {
        let listener = bind(&config.admin.bind_address).await?;
        let state = AdminState {
            api_key: Arc::from(config.admin.api_key.as_str()),
            gate: gate.clone(),
            traffic_watch: traffic_watch.clone(),
            node: Arc::new(node.clone()),
        };
        let app = setup_admin_router(state);
        let mut admin_shutdown = shutdown.subscribe();
        tracing::info!(address = %config.admin.bind_address, "Admin listener starting");
        tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = admin_shutdown.recv().await;
            });
            if let Err(e) = serve.await {
                tracing::error!(error = %e, "Admin server failed");
            }
        });
    }

    let routes = builtin_routes(node);
    for (method, template) in routes.templates() {
        tracing::debug!(%method, template = %template, "Route registered");
    }

    let listener = bind(&config.listener.bind_address).await?;
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::with_shared(config, Arc::new(routes), gate, traffic_watch);

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            signals::wait_for_termination().await;
            shutdown.trigger();
        });
    }

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
