//! Service registry subsystem.
//!
//! # Data Flow
//! ```text
//! services file (JSON array of descriptors)
//!     → descriptor.rs (deserialize, per-descriptor checks)
//!     → table.rs (build name-keyed table, reject duplicates)
//!     → ServiceRegistry (read-only for process lifetime)
//!     → shared via Arc with the forwarding path
//! ```
//!
//! # Design Decisions
//! - Registry is populated once at startup; no update or eviction exposed
//! - Lookup miss is a normal outcome (`Option`), not an error; transport
//!   failures during forwarding are a separate concern
//! - A plain immutable map; no cache/invalidation machinery

pub mod descriptor;
pub mod table;

pub use descriptor::ServiceDescriptor;
pub use table::{RegistryError, ServiceRegistry};
