//! Collections Gateway
//!
//! API gateway for the museum collections system, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │              COLLECTIONS GATEWAY              │
//!                     │                                               │
//!   Client Request    │  ┌─────────┐   ┌────────┐   ┌─────────────┐  │
//!   ──────────────────┼─▶│  http   │──▶│  auth  │──▶│  routing +  │  │
//!                     │  │ server  │   │  seam  │   │  registry   │  │
//!                     │  └─────────┘   └────────┘   └──────┬──────┘  │
//!                     │                                     │         │
//!                     │                                     ▼         │
//!   Client Response   │  ┌─────────┐               ┌─────────────┐   │
//!   ◀─────────────────┼──│ streamed│◀──────────────│  forwarder  │◀──┼── Backend
//!                     │  │ response│               │ (hyper leg) │   │   Service
//!                     │  └─────────┘               └─────────────┘   │
//!                     │                                               │
//!                     │  Cross-cutting: config, observability,        │
//!                     │  lifecycle, WebSocket echo/history            │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use tokio::net::TcpListener;

use collections_gateway::config;
use collections_gateway::http::HttpServer;
use collections_gateway::lifecycle::{signals, Shutdown};
use collections_gateway::observability::{logging, metrics};
use collections_gateway::registry::ServiceRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config/gateway.toml"));

    let config = if config_path.exists() {
        config::load_config(&config_path)?
    } else {
        config::config_from_env()?
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        config = %config_path.display(),
        bind_address = %config.listener.bind_address,
        base_path = %config.api.base_path,
        auth_enabled = config.auth.enabled,
        "Configuration loaded"
    );

    let registry = ServiceRegistry::from_file(Path::new(&config.api.services_file))?;
    tracing::info!(
        services_file = %config.api.services_file,
        services = registry.len(),
        "Service registry loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, registry);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
