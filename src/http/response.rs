//! Client-facing gateway responses.
//!
//! # Responsibilities
//! - Build the JSON error bodies the gateway emits itself (401/404/500)
//! - Build the empty-body response used for benign upstream resets
//!
//! # Design Decisions
//! - One body shape for every gateway error: `{"error": "<message>"}`
//! - Backend responses are never transformed; these helpers only cover
//!   responses the gateway originates

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// A gateway-originated error response with a JSON body.
pub fn json_error(status: StatusCode, message: &str) -> Response {
    let body = serde_json::to_string(&ErrorBody { error: message })
        .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string());

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

/// Response used when the upstream connection ended in a TCP reset.
///
/// The peer has almost always gone away by the time this is observed, so no
/// error body is sent; the connection is closed without further ceremony.
pub fn upstream_reset() -> Response {
    Response::builder()
        .status(StatusCode::BAD_GATEWAY)
        .header(header::CONNECTION, "close")
        .body(Body::empty())
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
