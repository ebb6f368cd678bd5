//! Forward-path parsing and target URL assembly.
//!
//! # Responsibilities
//! - Split an inbound URL into service name and remainder
//! - Assemble the backend URL from a descriptor and the remainder
//!
//! # Design Decisions
//! - Pure functions over string slices; no allocation until assembly
//! - `/api/<service>` with no remainder forwards to the backend root `/`
//! - An empty service segment (`/api/` or `/api`) is a no-match, not an
//!   error

use crate::registry::ServiceDescriptor;

/// The routing-relevant pieces of an inbound API path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardPath<'a> {
    /// Service name: the path segment after the base path.
    pub service: &'a str,
    /// Remainder of the path after the service segment, always starting
    /// with '/'.
    pub rest: &'a str,
    /// Raw query string, without the '?'.
    pub query: Option<&'a str>,
}

/// Parse an inbound path into a [`ForwardPath`].
///
/// Returns `None` when the path is outside the base path or names no
/// service. The query string is carried through verbatim.
pub fn parse_forward<'a>(
    base_path: &str,
    path: &'a str,
    query: Option<&'a str>,
) -> Option<ForwardPath<'a>> {
    let after_base = path.strip_prefix(base_path)?;

    // "/apifoo" must not match a base path of "/api".
    let after_base = after_base.strip_prefix('/')?;
    if after_base.is_empty() {
        return None;
    }

    let (service, rest) = match after_base.find('/') {
        Some(idx) => (&after_base[..idx], &after_base[idx..]),
        None => (after_base, "/"),
    };
    if service.is_empty() {
        return None;
    }

    Some(ForwardPath {
        service,
        rest,
        query,
    })
}

/// Assemble the backend URL for a parsed path and a resolved descriptor.
pub fn target_url(descriptor: &ServiceDescriptor, forward: &ForwardPath<'_>) -> String {
    match forward.query {
        Some(query) => format!("{}{}?{}", descriptor.base_url(), forward.rest, query),
        None => format!("{}{}", descriptor.base_url(), forward.rest),
    }
}
