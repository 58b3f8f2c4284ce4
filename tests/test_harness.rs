//! Test harness for spawning a dispatcher and satellites on ephemeral ports.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use ground_control::client;
use ground_control::config::{ClientConfig, DispatcherConfig, SatelliteConfig};
use ground_control::dispatcher::Dispatcher;
use ground_control::error::{FabricError, Result};
use ground_control::satellite::{Capability, CapabilityCatalog, CapabilitySource, Satellite};

pub const DOUBLE: &str = "test.double";
pub const SLOW_DOUBLE: &str = "test.slow_double";
pub const WHOAMI: &str = "test.whoami";

pub const SLOW_JOB_DELAY: Duration = Duration::from_millis(800);

/// Doubles an integer input.
pub struct Doubler;

impl Capability for Doubler {
    fn execute(&self, input: Value) -> Result<Value> {
        let n = input
            .as_i64()
            .ok_or_else(|| FabricError::Capability("expected an integer".to_string()))?;
        Ok(json!(n * 2))
    }
}

/// Doubles an integer input after a fixed delay.
pub struct SlowDoubler;

impl Capability for SlowDoubler {
    fn execute(&self, input: Value) -> Result<Value> {
        std::thread::sleep(SLOW_JOB_DELAY);
        Doubler.execute(input)
    }
}

/// Answers with a fixed label, used to observe which satellite served a job.
pub struct Identify {
    label: String,
}

impl Capability for Identify {
    fn execute(&self, _input: Value) -> Result<Value> {
        Ok(json!(self.label))
    }
}

/// The catalog every test satellite runs with.
pub fn worker_catalog(label: &str) -> CapabilityCatalog {
    let label = label.to_string();
    CapabilityCatalog::new()
        .register(DOUBLE, || Doubler)
        .register(SLOW_DOUBLE, || SlowDoubler)
        .register(WHOAMI, move || Identify {
            label: label.clone(),
        })
}

/// Source wrapper that counts how often the inner source is hit.
pub struct CountingSource {
    inner: CapabilityCatalog,
    fetches: Arc<AtomicUsize>,
}

impl CountingSource {
    pub fn wrap(inner: CapabilityCatalog) -> (Self, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                fetches: fetches.clone(),
            },
            fetches,
        )
    }
}

#[async_trait]
impl CapabilitySource for CountingSource {
    async fn fetch(&self, name: &str) -> Result<Box<dyn Capability>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(name).await
    }
}

/// A dispatcher plus any number of satellites, all on ephemeral ports.
pub struct TestFabric {
    pub dispatcher_addr: SocketAddr,
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl TestFabric {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dispatcher_addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();

        let dispatcher = Dispatcher::new(DispatcherConfig::new(dispatcher_addr));
        let token = shutdown.clone();
        let handle = tokio::spawn(async move {
            dispatcher
                .run_on(listener, token)
                .await
                .expect("dispatcher failed");
        });

        Self {
            dispatcher_addr,
            shutdown,
            handles: vec![handle],
        }
    }

    /// Spawn a satellite and return the address it serves jobs on.
    pub async fn spawn_satellite(
        &mut self,
        name: &str,
        source: Arc<dyn CapabilitySource>,
    ) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = SatelliteConfig::new(name, addr, self.dispatcher_addr.to_string());
        let satellite = Satellite::new(config, source);
        let token = self.shutdown.clone();
        self.handles.push(tokio::spawn(async move {
            satellite
                .run_on(listener, token)
                .await
                .expect("satellite failed");
        }));
        addr
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            dispatcher_addr: self.dispatcher_addr.to_string(),
            connect_timeout: Duration::from_secs(2),
            reply_timeout: Duration::from_secs(10),
        }
    }

    pub async fn submit(&self, capability: &str, input: Value) -> Result<Value> {
        client::submit_job(&self.client_config(), capability, input).await
    }

    /// Retry a submission until it succeeds; covers the registration race
    /// between spawning a satellite and its envelope reaching the dispatcher.
    pub async fn submit_until_ok(&self, capability: &str, input: Value) -> Value {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            match self.submit(capability, input.clone()).await {
                Ok(value) => return value,
                Err(e) if tokio::time::Instant::now() >= deadline => {
                    panic!("job never succeeded: {}", e)
                }
                Err(_) => tokio::time::sleep(Duration::from_millis(25)).await,
            }
        }
    }

    /// Poll the `whoami` probe until every named satellite has answered.
    #[allow(dead_code)]
    pub async fn wait_for_satellites(&self, names: &[&str]) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        let mut seen: HashSet<String> = HashSet::new();
        while seen.len() < names.len() {
            assert!(
                tokio::time::Instant::now() < deadline,
                "satellites {:?} never all registered, saw {:?}",
                names,
                seen
            );
            if let Ok(value) = self.submit(WHOAMI, json!(null)).await {
                if let Some(name) = value.as_str() {
                    seen.insert(name.to_string());
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    }

    pub fn stop(self) {
        self.shutdown.cancel();
    }
}

impl Drop for TestFabric {
    fn drop(&mut self) {
        self.shutdown.cancel();
        for handle in &self.handles {
            handle.abort();
        }
    }
}
