//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use interview_router::config::RouterConfig;
use interview_router::error::ExecutorError;
use interview_router::executor::{ExecKind, ExecOutcome, ExecRequest, Executor};
use interview_router::{HttpServer, Shutdown};

/// What the fake collaborator does for one backend.
#[derive(Debug, Clone)]
pub enum Behavior {
    Ok(Option<u64>),
    Fail(Option<u64>, &'static str),
    TransportError,
    Panic,
    Slow(Duration, u64),
}

/// Deterministic stand-in for the agent process.
///
/// Behaviour is keyed by `provider:model`; unknown keys get the default.
pub struct ScriptedExecutor {
    behaviors: Mutex<HashMap<String, Behavior>>,
    default: Behavior,
    calls: AtomicUsize,
    interviews: Mutex<Vec<ExecRequest>>,
}

impl ScriptedExecutor {
    pub fn new(default: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behaviors: Mutex::new(HashMap::new()),
            default,
            calls: AtomicUsize::new(0),
            interviews: Mutex::new(Vec::new()),
        })
    }

    pub fn set(&self, key: &str, behavior: Behavior) {
        self.behaviors.lock().unwrap().insert(key.to_string(), behavior);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn interviews(&self) -> Vec<ExecRequest> {
        self.interviews.lock().unwrap().clone()
    }
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn execute(&self, request: ExecRequest) -> Result<ExecOutcome, ExecutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = format!("{}:{}", request.provider, request.model);
        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| self.default.clone());

        if request.kind == ExecKind::Interview {
            self.interviews.lock().unwrap().push(request.clone());
        }

        match behavior {
            Behavior::Ok(latency) => {
                let mut outcome = ExecOutcome::success(latency);
                outcome
                    .extra
                    .insert("provider".into(), request.provider.clone().into());
                Ok(outcome)
            }
            Behavior::Fail(latency, error) => Ok(ExecOutcome::failure(latency, error)),
            Behavior::TransportError => Err(ExecutorError::Timeout(20_000)),
            Behavior::Panic => panic!("scripted panic for {}", key),
            Behavior::Slow(delay, latency) => {
                tokio::time::sleep(delay).await;
                Ok(ExecOutcome::success(Some(latency)))
            }
        }
    }
}

/// Config with the periodic loop disabled so tests drive probing explicitly.
pub fn quiet_config() -> RouterConfig {
    let mut config = RouterConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.health.enabled = false;
    config
}

/// A server listening on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}

pub async fn start_server(config: RouterConfig, executor: Arc<dyn Executor>) -> TestServer {
    let server = HttpServer::new(config, executor).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let handle = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            let _ = server.run(listener, shutdown).await;
        }
    });

    // Give the accept loop a moment to subscribe to shutdown.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
