//! End-to-end health and fallback behaviour with a scripted collaborator.

use std::sync::Arc;
use std::time::Duration;

use interview_router::config::HealthConfig;
use interview_router::error::RouterError;
use interview_router::fallback::{FallbackLog, FallbackReason, FallbackSelector, FallbackSource};
use interview_router::health::{HealthMonitor, HealthPolicy, Prober};
use interview_router::lifecycle::Shutdown;
use interview_router::registry::{HealthRecord, Registry};

mod common;
use common::{Behavior, ScriptedExecutor};

struct Harness {
    registry: Arc<Registry>,
    monitor: HealthMonitor,
    selector: FallbackSelector,
}

fn harness(executor: Arc<ScriptedExecutor>, keys: &[(&str, &str)], health: &HealthConfig) -> Harness {
    let registry = Arc::new(Registry::new());
    for (provider, model) in keys {
        registry.register(provider, model).unwrap();
    }
    let policy = HealthPolicy::from(health);
    let prober = Arc::new(Prober::new(executor, policy, health.probe_prompt.clone()));
    let monitor = HealthMonitor::new(Arc::clone(&registry), prober, health);
    let selector = FallbackSelector::new(Arc::clone(&registry), policy, Arc::new(FallbackLog::new()));
    Harness {
        registry,
        monitor,
        selector,
    }
}

const DEFAULT_KEYS: [(&str, &str); 3] = [
    ("openai", "gpt-4o-mini"),
    ("openai", "gpt-4o"),
    ("anthropic", "claude-3-5-sonnet-latest"),
];

#[tokio::test]
async fn test_primary_down_falls_back_in_registry_order() {
    let executor = ScriptedExecutor::new(Behavior::Ok(Some(150)));
    executor.set("openai:gpt-4o", Behavior::Fail(None, "HTTP 500"));
    let h = harness(executor.clone(), &DEFAULT_KEYS[..2], &HealthConfig::default());

    // Three failed cycles for gpt-4o, anthropic registered afterwards and never probed.
    for _ in 0..3 {
        h.monitor.probe_all().await;
    }
    h.registry.register("anthropic", "claude-3-5-sonnet-latest").unwrap();

    let gpt4o = h.registry.get("openai:gpt-4o").unwrap().health();
    assert_eq!(gpt4o.consecutive_failures, 3);
    assert_eq!(gpt4o.ok, Some(false));
    assert_eq!(
        h.registry
            .get("anthropic:claude-3-5-sonnet-latest")
            .unwrap()
            .health()
            .last_checked_at,
        None
    );

    let (candidates, _) = h.selector.candidates("openai:gpt-4o", &[]);
    assert_eq!(
        candidates,
        vec![
            "openai:gpt-4o".to_string(),
            "openai:gpt-4o-mini".to_string(),
            "anthropic:claude-3-5-sonnet-latest".to_string(),
        ]
    );

    let resolution = h.selector.resolve("sim-42", "openai:gpt-4o", &[]).unwrap();
    assert_eq!(resolution.chosen, "openai:gpt-4o-mini");
    assert!(resolution.used_fallback);
    assert_eq!(resolution.fallback_source, FallbackSource::Auto);

    let events = h.selector.log().list();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, FallbackReason::PrimaryUnhealthy);
    assert_eq!(events[0].simulation_id, "sim-42");
}

#[tokio::test]
async fn test_batch_isolation() {
    let executor = ScriptedExecutor::new(Behavior::Ok(Some(100)));
    executor.set("openai:gpt-4o", Behavior::Panic);
    let h = harness(executor.clone(), &DEFAULT_KEYS, &HealthConfig::default());

    let outcomes = h.monitor.probe_all().await;
    assert_eq!(outcomes.len(), 3);

    let by_key = |key: &str| outcomes.iter().find(|o| o.key == key).unwrap().clone();
    assert_eq!(by_key("openai:gpt-4o-mini").health.ok, Some(true));
    assert_eq!(by_key("anthropic:claude-3-5-sonnet-latest").health.ok, Some(true));

    let broken = by_key("openai:gpt-4o");
    assert_eq!(broken.health.ok, Some(false));
    assert_eq!(broken.health.consecutive_failures, 1);
    assert!(broken.health.error.is_some());
}

#[tokio::test]
async fn test_transport_error_counts_as_failure() {
    let executor = ScriptedExecutor::new(Behavior::TransportError);
    let h = harness(executor, &DEFAULT_KEYS[..1], &HealthConfig::default());

    let snapshot = h.monitor.probe_one("openai:gpt-4o-mini").await.unwrap();
    assert_eq!(snapshot.health.ok, Some(false));
    assert_eq!(snapshot.health.latency_ms, None);
    assert!(snapshot.health.error.unwrap().contains("timed out"));

    let err = h.selector.resolve("sim", "openai:gpt-4o-mini", &[]).unwrap_err();
    assert!(matches!(err, RouterError::Unavailable { .. }));
    assert_eq!(h.selector.log().list()[0].reason, FallbackReason::NoHealthyModel);
}

#[tokio::test]
async fn test_slow_backend_exceeds_latency_ceiling() {
    let executor = ScriptedExecutor::new(Behavior::Ok(Some(100)));
    executor.set("openai:gpt-4o-mini", Behavior::Slow(Duration::from_millis(5), 2501));
    let h = harness(executor, &DEFAULT_KEYS[..2], &HealthConfig::default());

    h.monitor.probe_all().await;
    let mini = h.registry.get("openai:gpt-4o-mini").unwrap().health();
    assert_eq!(mini.ok, Some(true));
    assert_eq!(mini.latency_ms, Some(2501));

    let resolution = h
        .selector
        .resolve("sim", "openai:gpt-4o-mini", &["openai:gpt-4o".to_string()])
        .unwrap();
    assert_eq!(resolution.chosen, "openai:gpt-4o");
    assert_eq!(resolution.fallback_source, FallbackSource::Caller);
}

#[tokio::test]
async fn test_recovery_resets_failures() {
    let executor = ScriptedExecutor::new(Behavior::Fail(Some(40), "rate limited"));
    let h = harness(executor.clone(), &DEFAULT_KEYS[..1], &HealthConfig::default());

    h.monitor.probe_all().await;
    h.monitor.probe_all().await;
    let backend = h.registry.get("openai:gpt-4o-mini").unwrap();
    assert_eq!(backend.health().consecutive_failures, 2);
    assert_eq!(backend.health().latency_ms, Some(40));

    executor.set("openai:gpt-4o-mini", Behavior::Ok(Some(90)));
    h.monitor.probe_all().await;
    let record = backend.health();
    assert_eq!(record.consecutive_failures, 0);
    assert_eq!(record.error, None);
    assert!(HealthPolicy::default().is_healthy(&record, record.last_checked_at.unwrap()));
}

#[tokio::test]
async fn test_periodic_loop_probes_eagerly_and_repeatedly() {
    let executor = ScriptedExecutor::new(Behavior::Ok(Some(10)));
    let health = HealthConfig {
        interval_ms: 20,
        ..HealthConfig::default()
    };
    let h = harness(executor.clone(), &DEFAULT_KEYS, &health);

    let shutdown = Shutdown::new();
    let task = tokio::spawn(h.monitor.clone().run(shutdown.subscribe()));

    tokio::time::sleep(Duration::from_millis(150)).await;
    let status = h.monitor.status();
    assert!(status.running);
    assert!(status.cycles >= 2, "expected several cycles, got {}", status.cycles);
    assert_eq!(status.last_healthy, 3);
    assert!(executor.calls() >= 6);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("monitor should stop")
        .unwrap();
    assert!(!h.monitor.status().running);
}

#[tokio::test]
async fn test_clear_log_keeps_health() {
    let executor = ScriptedExecutor::new(Behavior::Ok(Some(10)));
    executor.set("openai:gpt-4o", Behavior::Fail(None, "down"));
    let h = harness(executor, &DEFAULT_KEYS, &HealthConfig::default());
    h.monitor.probe_all().await;

    h.selector.resolve("a", "openai:gpt-4o", &[]).unwrap();
    h.selector.resolve("b", "openai:gpt-4o", &[]).unwrap();
    let before: Vec<Arc<HealthRecord>> = h.registry.all_backends().iter().map(|b| b.health()).collect();

    assert_eq!(h.selector.log().clear(), 2);
    assert!(h.selector.log().is_empty());

    let after: Vec<Arc<HealthRecord>> = h.registry.all_backends().iter().map(|b| b.health()).collect();
    assert_eq!(before, after);
}
