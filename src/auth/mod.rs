//! Authentication seam.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → auth middleware (upstream of the forwarder)
//!     → Authenticator::authenticate(&request)
//!     → Ok(Identity): attached as request extension, request proceeds
//!     → Err(AuthError): 401 with JSON body, forwarder never runs
//! ```
//!
//! # Design Decisions
//! - The identity-provider round trip (OAuth, token minting) is not
//!   reimplemented; it lives behind the `Authenticator` trait
//! - The bundled implementations are a passthrough (auth disabled) and a
//!   bearer-credential check against the configured client secret
//! - Authentication applies to the forwarding surface only

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

use crate::config::AuthConfig;
use crate::http::response::json_error;
use crate::http::server::AppState;

/// Authenticated caller identity, attached to requests as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable subject identifier for the caller.
    pub subject: String,
}

/// Authentication failure.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,

    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Capability consumed upstream of the forwarder.
pub trait Authenticator: Send + Sync {
    /// Authenticate a request, yielding the caller's identity.
    fn authenticate(&self, request: &Request<Body>) -> Result<Identity, AuthError>;
}

/// Passthrough used when authentication is disabled.
#[derive(Debug, Default)]
pub struct NoAuth;

impl Authenticator for NoAuth {
    fn authenticate(&self, _request: &Request<Body>) -> Result<Identity, AuthError> {
        Ok(Identity {
            subject: "anonymous".to_string(),
        })
    }
}

/// Checks the `Authorization: Bearer` header against a shared secret.
#[derive(Debug)]
pub struct BearerAuthenticator {
    subject: String,
    secret: String,
}

impl BearerAuthenticator {
    pub fn new(subject: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            secret: secret.into(),
        }
    }
}

impl Authenticator for BearerAuthenticator {
    fn authenticate(&self, request: &Request<Body>) -> Result<Identity, AuthError> {
        let header_value = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingCredentials)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MissingCredentials)?;

        if token == self.secret {
            Ok(Identity {
                subject: self.subject.clone(),
            })
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Build the configured authenticator.
pub fn from_config(config: &AuthConfig) -> Arc<dyn Authenticator> {
    if config.enabled {
        let subject = if config.client_id.is_empty() {
            "client"
        } else {
            config.client_id.as_str()
        };
        Arc::new(BearerAuthenticator::new(subject, config.client_secret.clone()))
    } else {
        Arc::new(NoAuth)
    }
}

/// Middleware applying the authenticator ahead of the forwarder.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match state.authenticator.authenticate(&request) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected unauthenticated request");
            json_error(StatusCode::UNAUTHORIZED, &e.to_string())
        }
    }
}
