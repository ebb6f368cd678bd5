//! Collections Gateway Library
//!
//! API gateway for the museum collections system: a static service registry
//! and a streaming request forwarder, plus the surrounding operational
//! surface (auth seam, WebSocket echo/history, observability).

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::{ServiceDescriptor, ServiceRegistry};
