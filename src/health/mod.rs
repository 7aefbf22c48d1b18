//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Startup + periodic timer, or operator request
//!     → Probe each backend concurrently (probe.rs)
//!     → Swap in a new health record per backend
//!
//! Verdict (state.rs):
//!     Health record + now
//!     → fresh? succeeded? fast enough?
//!     → healthy / unhealthy
//! ```
//!
//! # Design Decisions
//! - Probing and judging are separate: records store observations,
//!   the verdict is computed on read
//! - A failed probe is data, never an error
//! - Health state is per-backend

pub mod active;
pub mod probe;
pub mod state;

pub use active::{CycleReport, HealthMonitor, MonitorSnapshot};
pub use probe::Prober;
pub use state::{is_healthy, now_millis, HealthPolicy};
