//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the forwarding and WebSocket surfaces
//! - Wire up middleware (tracing, request ID, authentication)
//! - Hold the shared application state
//! - Serve until shutdown is signalled
//!
//! # Design Decisions
//! - Authentication wraps the forwarding surface only; the WebSocket
//!   endpoint and unmatched paths are outside it
//! - One shared outbound client; connections may be reused across requests
//! - No request timeout: a slow backend holds the inbound connection open

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{any, get};
use axum::Router;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::auth::{self, Authenticator};
use crate::config::GatewayConfig;
use crate::http::forward::forward_handler;
use crate::http::request::RequestIdLayer;
use crate::http::response::json_error;
use crate::http::websocket::{ws_handler, MessageBuffer};
use crate::registry::ServiceRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ServiceRegistry>,
    pub client: Client<HttpConnector, Body>,
    pub base_path: String,
    pub authenticator: Arc<dyn Authenticator>,
    pub ws_history: Arc<Mutex<MessageBuffer>>,
}

/// HTTP server for the collections gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server from a validated config and registry.
    pub fn new(config: GatewayConfig, registry: ServiceRegistry) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            registry: Arc::new(registry),
            client,
            base_path: config.api.base_path.clone(),
            authenticator: auth::from_config(&config.auth),
            ws_history: Arc::new(Mutex::new(MessageBuffer::new(config.websocket.history_limit))),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let base = config.api.base_path.as_str();

        let forwarding = Router::new()
            .route(base, any(forward_handler))
            .route(&format!("{}/{{*rest}}", base), any(forward_handler))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                auth::auth_middleware,
            ));

        let mut router = Router::new().merge(forwarding).fallback(unmatched_handler);
        if config.websocket.enabled {
            router = router.route(&config.websocket.path, get(ws_handler));
        }

        router
            .with_state(state)
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Paths outside the forwarding and WebSocket surfaces.
async fn unmatched_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "no forwarding rule for path")
}
