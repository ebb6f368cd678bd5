//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request URL (path + query)
//!     → target.rs (strip base path, extract service segment)
//!     → Registry lookup by service name
//!     → target.rs (assemble backend URL from descriptor + remainder)
//!     → Return: target URL or explicit no-match
//! ```
//!
//! # Design Decisions
//! - Rewriting is purely syntactic: a function of the path and the
//!   descriptor, with no shared mutable state
//! - The query string passes through untouched
//! - Explicit no-match (`None`) rather than a default backend

pub mod target;

pub use target::{parse_forward, target_url, ForwardPath};
