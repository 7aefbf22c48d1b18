//! Interview router library: LLM backend health tracking and fallback routing.

pub mod config;
pub mod error;
pub mod executor;
pub mod fallback;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;

pub use config::schema::RouterConfig;
pub use error::{RouterError, RouterResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
