//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wire registry, prober, monitor and selector together
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID)
//! - Run the health monitor alongside the server
//! - Drain on shutdown

use axum::{
    body::Body,
    http::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::error::RouterResult;
use crate::executor::Executor;
use crate::fallback::{FallbackLog, FallbackSelector};
use crate::health::{HealthMonitor, HealthPolicy, Prober};
use crate::http::handlers;
use crate::lifecycle::Shutdown;
use crate::registry::Registry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub monitor: HealthMonitor,
    pub selector: FallbackSelector,
    pub executor: Arc<dyn Executor>,
    pub policy: HealthPolicy,
    pub interview_prompt: Arc<str>,
}

/// HTTP server for the interview router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    state: AppState,
}

impl HttpServer {
    /// Build every subsystem from configuration.
    ///
    /// Fails only if the seed backends contain a duplicate key.
    pub fn new(config: RouterConfig, executor: Arc<dyn Executor>) -> RouterResult<Self> {
        let registry = Arc::new(Registry::from_config(&config.backends)?);
        let policy = HealthPolicy::from(&config.health);

        let prober = Arc::new(Prober::new(
            Arc::clone(&executor),
            policy,
            config.health.probe_prompt.clone(),
        ));
        let monitor = HealthMonitor::new(Arc::clone(&registry), prober, &config.health);
        let selector =
            FallbackSelector::new(Arc::clone(&registry), policy, Arc::new(FallbackLog::new()));

        let state = AppState {
            registry,
            monitor,
            selector,
            executor,
            policy,
            interview_prompt: Arc::from(config.executor.interview_prompt.as_str()),
        };

        let router = Self::build_router(state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::root))
            .route("/health", get(handlers::list_health))
            .route("/health/probe", post(handlers::probe_all))
            .route("/health/{key}", get(handlers::get_health))
            .route("/health/{key}/probe", post(handlers::probe_one))
            .route("/backends", post(handlers::register_backend))
            .route("/resolve", post(handlers::resolve))
            .route("/interviews/start", post(handlers::start_interview))
            .route(
                "/fallbacks",
                get(handlers::list_fallbacks).delete(handlers::clear_fallbacks),
            )
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server and the health monitor until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.state.registry.len(),
            "HTTP server starting"
        );

        let monitor = tokio::spawn(self.state.monitor.clone().run(shutdown.subscribe()));

        let mut server_shutdown = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.recv().await;
            })
            .await?;

        if let Err(e) = monitor.await {
            tracing::error!(error = %e, "Health monitor task failed");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Shared state, for embedding and tests.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
