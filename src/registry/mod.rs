//! Backend registry subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     config.backends (seed set)
//!     → store.rs (register in order, reject duplicate keys)
//!
//! Runtime:
//!     health prober → backend.rs (swap in a new health record)
//!     fallback selector / HTTP → store.rs (lookup, ordered listing)
//! ```
//!
//! # Design Decisions
//! - Membership is append-only; there is no deregistration
//! - Registry is an explicit object shared via `Arc`, never a global
//! - Health is per-backend and replaced whole on every probe

pub mod backend;
pub mod store;

pub use backend::{backend_key, Backend, BackendSnapshot, HealthRecord};
pub use store::Registry;
