//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!
//! Shutdown (shutdown.rs):
//!     Broadcast → HTTP server drains, health monitor leaves its loop
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
