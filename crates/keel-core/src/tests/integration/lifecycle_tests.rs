#![cfg(test)]

use std::sync::Arc;

use crate::config::RuntimeParams;
use crate::event::MemorySink;
use crate::kernel::error::Error;
use crate::kernel::host::{HostState, LifecycleHost};
use crate::registry::ComponentRegistry;
use crate::tests::integration::common::{
    chain_config, key, register_tracked, CHAIN, Tracked, TrackedInstance, RecordingProcessHost, Tracker,
};

fn chain_host(registry: ComponentRegistry, sink: Arc<MemorySink>) -> Arc<LifecycleHost> {
    LifecycleHost::builder(chain_config(), registry)
        .sink(sink)
        .process_host(RecordingProcessHost::new())
        .build()
}

#[tokio::test]
async fn test_db_cache_server_start_and_stop_order() {
    let tracker = Tracker::new();
    let mut registry = ComponentRegistry::new();
    for name in CHAIN {
        register_tracked(&mut registry, name, Tracked::new(&tracker));
    }
    let sink = Arc::new(MemorySink::new());
    let host = chain_host(registry, sink.clone());

    host.start_system(&RuntimeParams::new()).await.expect("start should succeed");
    assert_eq!(tracker.started(), vec!["app/db", "app/cache", "app/server"]);

    let server = host
        .component::<TrackedInstance>(&key("app/server"))
        .await
        .expect("server should be running");
    assert_eq!(server.dependencies, vec!["cache"]);
    assert_eq!(server.values["port"], serde_json::json!(8080));

    let report = host.stop_system().await;
    assert!(report.is_clean());
    assert_eq!(tracker.stopped(), vec!["app/server", "app/cache", "app/db"]);
    assert_eq!(host.status().await.state, HostState::Stopped);
}

#[tokio::test]
async fn test_failing_cache_rolls_back_db_and_never_builds_server() {
    let tracker = Tracker::new();
    let mut registry = ComponentRegistry::new();
    register_tracked(&mut registry, "app/db", Tracked::new(&tracker));
    register_tracked(&mut registry, "app/cache", Tracked::new(&tracker).failing_start());
    register_tracked(&mut registry, "app/server", Tracked::new(&tracker));
    let sink = Arc::new(MemorySink::new());
    let host = chain_host(registry, sink.clone());

    let result = host.start_system(&RuntimeParams::new()).await;
    match result {
        Err(Error::Init(init_error)) => {
            assert_eq!(init_error.key, key("app/cache"));
            assert_eq!(init_error.rollback.len(), 1);
        }
        other => panic!("Expected Error::Init, got {:?}", other),
    }

    assert_eq!(tracker.started(), vec!["app/db", "app/cache"]);
    assert_eq!(tracker.stopped(), vec!["app/db"]);
    assert!(!tracker.started().contains(&"app/server".to_string()));

    // Nothing is published and the host can be stopped safely
    assert_eq!(host.status().await.state, HostState::Stopped);
    assert!(host.stop_system().await.is_empty());
    assert_eq!(tracker.stopped(), vec!["app/db"]);

    let kinds = sink.kinds();
    assert!(kinds.contains(&"rollback-started"));
    assert_eq!(kinds.last(), Some(&"system-start-failed"));
}

#[tokio::test]
async fn test_shutdown_signal_stops_running_system() {
    let tracker = Tracker::new();
    let mut registry = ComponentRegistry::new();
    for name in CHAIN {
        register_tracked(&mut registry, name, Tracked::new(&tracker));
    }
    let process = RecordingProcessHost::new();
    let host = LifecycleHost::builder(chain_config(), registry)
        .sink(Arc::new(MemorySink::new()))
        .process_host(process.clone())
        .build();

    host.start_system(&RuntimeParams::new()).await.unwrap();
    assert_eq!(process.hook_count(), 1);

    process.fire_shutdown().await;
    assert_eq!(tracker.stopped(), vec!["app/server", "app/cache", "app/db"]);
    assert!(!host.is_running().await);
}
