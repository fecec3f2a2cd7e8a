#![cfg(test)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{ComponentDecl, SystemConfig};
use crate::event::LogSink;
use crate::host::{ProcessHost, ShutdownHook};
use crate::kernel::component::{BoxError, ComponentContext, ComponentKey, Instance};
use crate::registry::{ComponentRegistry, Constructor, Destructor};

// ===== TRACKING =====

/// Records constructor and destructor calls as `start:<key>` / `stop:<key>`.
#[derive(Debug, Default)]
pub struct Tracker {
    calls: Mutex<Vec<String>>,
}

impl Tracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Keys whose constructor was invoked, in order.
    pub fn started(&self) -> Vec<String> {
        self.with_prefix("start:")
    }

    /// Keys whose destructor was invoked, in order.
    pub fn stopped(&self) -> Vec<String> {
        self.with_prefix("stop:")
    }

    fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|call| call.strip_prefix(prefix).map(str::to_string))
            .collect()
    }
}

// ===== MOCK COMPONENTS =====

/// What a [`Tracked`] constructor produces.
#[derive(Debug)]
pub struct TrackedInstance {
    pub key: String,
    pub dependencies: Vec<String>,
    pub values: Value,
}

/// Constructor and destructor that report to a [`Tracker`] and can be told to fail.
#[derive(Clone)]
pub struct Tracked {
    tracker: Arc<Tracker>,
    fail_start: bool,
    fail_stop: bool,
    delay: Option<Duration>,
}

impl Tracked {
    pub fn new(tracker: &Arc<Tracker>) -> Self {
        Self {
            tracker: tracker.clone(),
            fail_start: false,
            fail_stop: false,
            delay: None,
        }
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Sleep for `delay` after recording the start call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Constructor for Tracked {
    async fn construct(&self, context: ComponentContext) -> Result<Instance, BoxError> {
        self.tracker.record(format!("start:{}", context.key()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_start {
            return Err(format!("{} refused to start", context.key()).into());
        }
        Ok(Arc::new(TrackedInstance {
            key: context.key().to_string(),
            dependencies: context.dependency_names().map(str::to_string).collect(),
            values: context.values_as_json(),
        }))
    }
}

#[async_trait]
impl Destructor for Tracked {
    async fn destruct(&self, key: ComponentKey, _instance: Instance) -> Result<(), BoxError> {
        self.tracker.record(format!("stop:{}", key));
        if self.fail_stop {
            return Err(format!("{} refused to stop", key).into());
        }
        Ok(())
    }
}

/// Register `tracked` as both constructor and destructor of `name`.
pub fn register_tracked(registry: &mut ComponentRegistry, name: &str, tracked: Tracked) {
    registry.register_with_destructor(name, tracked.clone(), tracked);
}

/// Registry with working tracked factories for every name in `names`.
pub fn tracked_registry(tracker: &Arc<Tracker>, names: &[&str]) -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    for name in names {
        register_tracked(&mut registry, name, Tracked::new(tracker));
    }
    registry
}

// ===== CONFIGURATIONS =====

/// `app/db` <- `app/cache` <- `app/server`, declared leaves last.
pub fn chain_config() -> SystemConfig {
    SystemConfig::new()
        .with_param("port", serde_json::json!(8080))
        .with_component(ComponentDecl::new("app/server").with_ref("cache", "app/cache").with_param(
            "port",
            "port",
            None,
        ))
        .with_component(ComponentDecl::new("app/cache").with_ref("db", "app/db"))
        .with_component(ComponentDecl::new("app/db").with_value("url", serde_json::json!("postgres://localhost/test")))
}

pub const CHAIN: [&str; 3] = ["app/db", "app/cache", "app/server"];

/// `svc/web` needs `svc/auth` and `svc/store`, `svc/auth` needs `svc/store`,
/// and `svc/metrics` fans out from `svc/store` as well.
pub fn diamond_config() -> SystemConfig {
    SystemConfig::new()
        .with_component(ComponentDecl::new("svc/web").with_ref("auth", "svc/auth").with_ref("store", "svc/store"))
        .with_component(ComponentDecl::new("svc/auth").with_ref("store", "svc/store"))
        .with_component(ComponentDecl::new("svc/store"))
        .with_component(ComponentDecl::new("svc/metrics").with_ref("store", "svc/store"))
}

pub const DIAMOND: [&str; 4] = ["svc/web", "svc/auth", "svc/store", "svc/metrics"];

/// (dependent, dependency) pairs of [`diamond_config`].
pub const DIAMOND_EDGES: [(&str, &str); 4] = [
    ("svc/web", "svc/auth"),
    ("svc/web", "svc/store"),
    ("svc/auth", "svc/store"),
    ("svc/metrics", "svc/store"),
];

pub fn key(text: &str) -> ComponentKey {
    ComponentKey::parse(text).unwrap()
}

/// Poll `condition` every few milliseconds for up to two seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

// ===== PROCESS HOST =====

/// Process host that records registrations and fires hooks on demand.
#[derive(Default)]
pub struct RecordingProcessHost {
    crash_installs: AtomicUsize,
    hooks: Mutex<Vec<ShutdownHook>>,
}

impl RecordingProcessHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn crash_installs(&self) -> usize {
        self.crash_installs.load(Ordering::SeqCst)
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.lock().unwrap().len()
    }

    /// Simulate a termination signal.
    pub async fn fire_shutdown(&self) {
        let hooks: Vec<ShutdownHook> = std::mem::take(&mut *self.hooks.lock().unwrap());
        for hook in hooks {
            hook().await;
        }
    }
}

impl ProcessHost for RecordingProcessHost {
    fn install_crash_interceptor(&self, _sink: Arc<dyn LogSink>) {
        self.crash_installs.fetch_add(1, Ordering::SeqCst);
    }

    fn register_shutdown_hook(&self, _sink: Arc<dyn LogSink>, hook: ShutdownHook) {
        self.hooks.lock().unwrap().push(hook);
    }
}
