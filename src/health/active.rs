//! Active health checking.
//!
//! # Responsibilities
//! - Probe every registered backend once at startup and then on a fixed cadence
//! - Offer an on-demand "probe all now" for operators
//! - Keep each cycle's outcome observable (logs, metrics, status counters)

use futures_util::future::join_all;
use futures_util::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthConfig;
use crate::error::RouterResult;
use crate::health::probe::Prober;
use crate::health::state::now_millis;
use crate::observability::metrics;
use crate::registry::{BackendSnapshot, Registry};

/// Summary of one full probe cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub probed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub healthy: usize,
    pub elapsed_ms: u64,
    pub outcomes: Vec<BackendSnapshot>,
}

/// Liveness counters for the periodic loop.
#[derive(Debug, Default)]
struct MonitorStatus {
    running: AtomicBool,
    cycles: AtomicU64,
    last_cycle_at: AtomicU64,
    last_healthy: AtomicUsize,
    last_failed: AtomicUsize,
    panics: AtomicU64,
}

/// Point-in-time copy of the monitor's liveness counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSnapshot {
    pub running: bool,
    pub interval_ms: u64,
    pub cycles: u64,
    pub last_cycle_at: Option<u64>,
    pub last_healthy: usize,
    pub last_failed: usize,
    pub panics: u64,
}

/// Periodic and on-demand prober for the whole registry.
#[derive(Clone)]
pub struct HealthMonitor {
    registry: Arc<Registry>,
    prober: Arc<Prober>,
    enabled: bool,
    interval: Duration,
    status: Arc<MonitorStatus>,
}

impl HealthMonitor {
    pub fn new(registry: Arc<Registry>, prober: Arc<Prober>, config: &HealthConfig) -> Self {
        Self {
            registry,
            prober,
            enabled: config.enabled,
            interval: Duration::from_millis(config.interval_ms.max(1)),
            status: Arc::new(MonitorStatus::default()),
        }
    }

    /// Run the periodic loop until shutdown. The first cycle starts immediately.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.enabled {
            tracing::info!("Periodic health probing disabled");
            return;
        }

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            backends = self.registry.len(),
            "Health monitor starting"
        );
        self.status.running.store(true, Ordering::Relaxed);

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.supervised_cycle().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        self.status.running.store(false, Ordering::Relaxed);
    }

    /// Probe every backend now and wait for all of them.
    pub async fn probe_all(&self) -> Vec<BackendSnapshot> {
        self.run_cycle().await.outcomes
    }

    /// Probe a single backend now.
    pub async fn probe_one(&self, key: &str) -> RouterResult<BackendSnapshot> {
        let backend = self.registry.get(key)?;
        Ok(self.prober.probe(&backend).await)
    }

    pub fn status(&self) -> MonitorSnapshot {
        let last_cycle_at = self.status.last_cycle_at.load(Ordering::Relaxed);
        MonitorSnapshot {
            running: self.status.running.load(Ordering::Relaxed),
            interval_ms: self.interval.as_millis() as u64,
            cycles: self.status.cycles.load(Ordering::Relaxed),
            last_cycle_at: (last_cycle_at != 0).then_some(last_cycle_at),
            last_healthy: self.status.last_healthy.load(Ordering::Relaxed),
            last_failed: self.status.last_failed.load(Ordering::Relaxed),
            panics: self.status.panics.load(Ordering::Relaxed),
        }
    }

    /// One scheduled cycle; a panic anywhere inside is logged and counted.
    async fn supervised_cycle(&self) {
        match AssertUnwindSafe(self.run_cycle()).catch_unwind().await {
            Ok(report) => {
                tracing::debug!(
                    probed = report.probed,
                    healthy = report.healthy,
                    failed = report.failed,
                    elapsed_ms = report.elapsed_ms,
                    "Periodic probe cycle complete"
                );
            }
            Err(_) => {
                self.status.panics.fetch_add(1, Ordering::Relaxed);
                metrics::record_cycle_panic();
                tracing::error!("Periodic probe cycle panicked; continuing with next tick");
            }
        }
    }

    async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();
        let backends = self.registry.all_backends();

        // Probes run concurrently; each is isolated so one panic or slow
        // backend cannot take the others' results with it.
        let probes = backends.iter().map(|backend| async move {
            match AssertUnwindSafe(self.prober.probe(backend)).catch_unwind().await {
                Ok(snapshot) => snapshot,
                Err(_) => {
                    self.status.panics.fetch_add(1, Ordering::Relaxed);
                    metrics::record_cycle_panic();
                    tracing::error!(key = %backend.key(), "Probe panicked");
                    self.prober.record_failure(backend, "probe panicked")
                }
            }
        });
        let outcomes = join_all(probes).await;

        let now = now_millis();
        let policy = self.prober.policy();
        let succeeded = outcomes.iter().filter(|o| o.health.ok == Some(true)).count();
        let healthy = outcomes
            .iter()
            .filter(|o| policy.is_healthy(&o.health, now))
            .count();
        let elapsed = started.elapsed();

        self.status.cycles.fetch_add(1, Ordering::Relaxed);
        self.status.last_cycle_at.store(now, Ordering::Relaxed);
        self.status.last_healthy.store(healthy, Ordering::Relaxed);
        self.status.last_failed.store(outcomes.len() - succeeded, Ordering::Relaxed);
        metrics::record_cycle(elapsed);

        CycleReport {
            probed: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            healthy,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutorError;
    use crate::executor::{ExecOutcome, ExecRequest, Executor};
    use crate::health::state::HealthPolicy;
    use async_trait::async_trait;

    /// Fails or panics for selected models, succeeds for the rest.
    struct Selective;

    #[async_trait]
    impl Executor for Selective {
        async fn execute(&self, request: ExecRequest) -> Result<ExecOutcome, ExecutorError> {
            match request.model.as_str() {
                "broken" => Err(ExecutorError::Exit {
                    code: 1,
                    output: "Traceback".into(),
                }),
                "panics" => panic!("agent wrapper bug"),
                _ => Ok(ExecOutcome::success(Some(150))),
            }
        }
    }

    fn monitor(models: &[&str], config: HealthConfig) -> HealthMonitor {
        let registry = Arc::new(Registry::new());
        for model in models {
            registry.register("openai", model).unwrap();
        }
        let prober = Arc::new(Prober::new(
            Arc::new(Selective),
            HealthPolicy::from(&config),
            "ping",
        ));
        HealthMonitor::new(registry, prober, &config)
    }

    #[tokio::test]
    async fn test_erroring_backend_does_not_abort_batch() {
        let monitor = monitor(&["a", "broken", "c"], HealthConfig::default());
        let outcomes = monitor.probe_all().await;

        let keys: Vec<_> = outcomes.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["openai:a", "openai:broken", "openai:c"]);
        assert_eq!(outcomes[0].health.ok, Some(true));
        assert_eq!(outcomes[1].health.ok, Some(false));
        assert_eq!(outcomes[1].health.error.as_deref(), Some("agent exit 1: Traceback"));
        assert_eq!(outcomes[2].health.ok, Some(true));
    }

    #[tokio::test]
    async fn test_panicking_probe_is_isolated() {
        let monitor = monitor(&["a", "panics", "c"], HealthConfig::default());
        let outcomes = monitor.probe_all().await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].health.ok, Some(true));
        assert_eq!(outcomes[1].health.ok, Some(false));
        assert_eq!(outcomes[1].health.error.as_deref(), Some("probe panicked"));
        assert_eq!(outcomes[1].health.consecutive_failures, 1);
        assert_eq!(outcomes[2].health.ok, Some(true));
        assert_eq!(monitor.status().panics, 1);
    }

    #[tokio::test]
    async fn test_probe_one_unknown_key() {
        let monitor = monitor(&["a"], HealthConfig::default());
        let err = monitor.probe_one("openai:zzz").await.unwrap_err();
        assert!(matches!(err, crate::error::RouterError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_loop_runs_eagerly_and_stops_on_shutdown() {
        let config = HealthConfig {
            interval_ms: 20,
            ..HealthConfig::default()
        };
        let monitor = monitor(&["a", "broken"], config);
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(monitor.clone().run(rx));
        tokio::time::sleep(Duration::from_millis(150)).await;

        let status = monitor.status();
        assert!(status.running);
        assert!(status.cycles >= 2, "expected several cycles, got {}", status.cycles);
        assert!(status.last_cycle_at.is_some());
        assert_eq!(status.last_healthy, 1);
        assert_eq!(status.last_failed, 1);

        tx.send(()).unwrap();
        handle.await.unwrap();
        assert!(!monitor.status().running);
    }

    #[tokio::test]
    async fn test_disabled_loop_returns_immediately() {
        let config = HealthConfig {
            enabled: false,
            ..HealthConfig::default()
        };
        let monitor = monitor(&["a"], config);
        let (_tx, rx) = broadcast::channel(1);

        monitor.clone().run(rx).await;
        assert_eq!(monitor.status().cycles, 0);
    }
}
