//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID)
//!     → [auth seam, then routing + registry decide the backend]
//!     → forward.rs (URL rewrite, streamed exchange)
//!     → response.rs (gateway-originated error bodies)
//!     → Send to client
//!
//! WebSocket upgrade
//!     → websocket.rs (echo loop + bounded history)
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
