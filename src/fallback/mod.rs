//! Fallback resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Work request (primary, fallbacks?)
//!     → selector.rs (candidate list, first healthy wins)
//!         → registry + health verdict (read only)
//!     → events.rs (audit entry when primary not used)
//!     → Resolution or Unavailable
//! ```

pub mod events;
pub mod selector;

pub use events::{FallbackEvent, FallbackLog, FallbackReason, FallbackSource};
pub use selector::{FallbackSelector, Resolution};
