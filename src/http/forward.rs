//! Request forwarding.
//!
//! # Responsibilities
//! - Resolve the inbound path to a registered service
//! - Rewrite the URL and stream the exchange through unmodified
//! - Map outbound failures to client-facing responses
//!
//! # Design Decisions
//! - Purely request-scoped: no session, retry, or timeout state
//! - Routing miss (404) is distinguished from transport failure (500) and
//!   never logged as an error
//! - An `ECONNRESET` on the outbound leg is a known artifact of client
//!   disconnects: logged, never answered with an error body

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode, Uri};
use axum::response::Response;

use crate::http::request::{RequestIdExt, X_REQUEST_ID};
use crate::http::response::{json_error, upstream_reset};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::{parse_forward, target_url};

/// Main forwarding handler. Mounted as the catch-all route.
pub async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request
        .request_id()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let method = request.method().to_string();

    let forward = match parse_forward(&state.base_path, &path, query.as_deref()) {
        Some(f) => f,
        None => {
            tracing::debug!(request_id = %request_id, path = %path, "Path outside forwarding surface");
            metrics::record_forward(&method, 404, "none", start);
            return json_error(StatusCode::NOT_FOUND, "no forwarding rule for path");
        }
    };

    let descriptor = match state.registry.get(forward.service) {
        Some(d) => d,
        None => {
            // Lookup miss is a normal outcome; no outbound connection is made.
            tracing::debug!(
                request_id = %request_id,
                service = %forward.service,
                "Unknown service requested"
            );
            metrics::record_forward(&method, 404, "none", start);
            return json_error(
                StatusCode::NOT_FOUND,
                &format!("unknown service {:?}", forward.service),
            );
        }
    };

    let target = target_url(descriptor, &forward);
    let uri: Uri = match target.parse() {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, target = %target, error = %e, "Rewrote to unparseable URL");
            metrics::record_forward(&method, 500, &descriptor.name, start);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "invalid rewrite target");
        }
    };

    // Stream the inbound body straight through to the backend.
    let (parts, body) = request.into_parts();
    let mut outbound = Request::builder().method(parts.method.clone()).uri(uri);
    if let Some(headers) = outbound.headers_mut() {
        for (name, value) in parts.headers.iter() {
            // The client derives Host from the target URL.
            if name != &header::HOST {
                headers.insert(name.clone(), value.clone());
            }
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert(X_REQUEST_ID, value);
        }
    }
    let outbound = match outbound.body(body) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build outbound request");
            metrics::record_forward(&method, 500, &descriptor.name, start);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "invalid outbound request");
        }
    };

    match state.client.request(outbound).await {
        Ok(upstream) => {
            let status = upstream.status();
            tracing::info!(
                request_id = %request_id,
                method = %method,
                service = %descriptor.name,
                target = %target,
                status = status.as_u16(),
                "Forwarded"
            );
            metrics::record_forward(&method, status.as_u16(), &descriptor.name, start);

            // Stream the backend response back unmodified. A reset mid-body
            // propagates through the piped stream and tears the inbound
            // connection down with it.
            let (parts, body) = upstream.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            if is_connection_reset(&e) {
                tracing::warn!(
                    request_id = %request_id,
                    service = %descriptor.name,
                    target = %target,
                    "Upstream connection reset"
                );
                metrics::record_forward(&method, 502, &descriptor.name, start);
                return upstream_reset();
            }

            let message = error_chain(&e);
            tracing::error!(
                request_id = %request_id,
                service = %descriptor.name,
                target = %target,
                error = %message,
                "Upstream request failed"
            );
            metrics::record_forward(&method, 500, &descriptor.name, start);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &message)
        }
    }
}

/// Walk an error's source chain looking for a TCP reset.
fn is_connection_reset(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        current = e.source();
    }
    false
}

/// Render an error with its full source chain.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(e) = current {
        message.push_str(": ");
        message.push_str(&e.to_string());
        current = e.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug)]
    struct Wrapper(io::Error);

    impl std::fmt::Display for Wrapper {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "outbound failed")
        }
    }

    impl std::error::Error for Wrapper {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn detects_reset_at_top_level() {
        let err = io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer");
        assert!(is_connection_reset(&err));
    }

    #[test]
    fn detects_reset_through_source_chain() {
        let err = Wrapper(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"));
        assert!(is_connection_reset(&err));
    }

    #[test]
    fn refused_is_not_reset() {
        let err = Wrapper(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert!(!is_connection_reset(&err));
    }

    #[test]
    fn error_chain_joins_sources() {
        let err = Wrapper(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert_eq!(error_chain(&err), "outbound failed: connection refused");
    }
}
