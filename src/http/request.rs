//! Request identity handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) as early as possible
//! - Preserve an ID supplied by the caller
//! - Expose the ID to handlers and to the outbound leg
//!
//! # Design Decisions
//! - Header and extension are both set, so handlers can read the ID without
//!   re-parsing headers
//! - The layer never fails: a malformed inbound ID is replaced, not rejected

use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header::HeaderName, HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Canonical request ID header.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID attached to every inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extension trait for reading the request ID off a request.
pub trait RequestIdExt {
    /// The request ID, if the layer has run.
    fn request_id(&self) -> Option<&RequestId>;
}

impl RequestIdExt for Request<Body> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Tower layer that installs [`RequestId`] on every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service wrapper produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let id = req
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // to_str succeeded or the value is a fresh UUID, so this cannot fail.
        if let Ok(value) = HeaderValue::from_str(&id) {
            req.headers_mut()
                .insert(HeaderName::from_static(X_REQUEST_ID), value);
        }
        req.extensions_mut().insert(RequestId(id));

        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    async fn id_of(req: Request<Body>) -> (String, String) {
        let svc = tower::service_fn(|req: Request<Body>| async move {
            let header = req
                .headers()
                .get(X_REQUEST_ID)
                .unwrap()
                .to_str()
                .unwrap()
                .to_string();
            let ext = req.request_id().unwrap().0.clone();
            Ok::<_, std::convert::Infallible>((header, ext))
        });
        RequestIdLayer.layer(svc).oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn generates_id_when_missing() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let (header, ext) = id_of(req).await;
        assert_eq!(header, ext);
        assert!(Uuid::parse_str(&header).is_ok());
    }

    #[tokio::test]
    async fn preserves_caller_supplied_id() {
        let req = Request::builder()
            .header(X_REQUEST_ID, "trace-me-7")
            .body(Body::empty())
            .unwrap();
        let (header, ext) = id_of(req).await;
        assert_eq!(header, "trace-me-7");
        assert_eq!(ext, "trace-me-7");
    }

    #[tokio::test]
    async fn replaces_empty_id() {
        let req = Request::builder()
            .header(X_REQUEST_ID, "")
            .body(Body::empty())
            .unwrap();
        let (header, _) = id_of(req).await;
        assert!(!header.is_empty());
    }
}
