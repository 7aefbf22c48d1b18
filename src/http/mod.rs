//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → handlers.rs
//!         /health*      → registry + monitor
//!         /resolve      → fallback selector
//!         /interviews/* → fallback selector → executor
//!         /fallbacks    → fallback log
//!     → error.rs (RouterError → status code + JSON body)
//! ```

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
