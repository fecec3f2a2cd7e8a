#![cfg(test)]

use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use crate::config::{expand, RuntimeParams, SystemConfig};
use crate::event::MemorySink;
use crate::kernel::host::LifecycleHost;
use crate::tests::integration::common::{key, tracked_registry, TrackedInstance, RecordingProcessHost, Tracker};

const SYSTEM_TOML: &str = r#"
[params]
pool-size = 4

[[components]]
key = "web/server"
factory = "server"
config = { store = { ref = "data/store" }, port = { param = "port", default = 3000 } }

[[components]]
key = "data/store"
factory = "store"
config = { pool = { size = { param = "pool-size" } } }

[[components]]
key = "data/metrics"
factory = "store"
enabled = false
"#;

#[tokio::test]
async fn test_toml_file_drives_a_full_cycle() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("system.toml");
    fs::write(&path, SYSTEM_TOML).unwrap();

    let config = SystemConfig::load(&path).expect("config should load");
    assert_eq!(config.components.len(), 3);

    let tracker = Tracker::new();
    let registry = tracked_registry(&tracker, &["server", "store"]);

    let params = RuntimeParams::new().with("port", serde_json::json!(9000));
    let graph = expand(&config, &params, &registry).unwrap();
    assert_eq!(graph.order(), vec![key("data/store"), key("web/server")]);

    let host = LifecycleHost::builder(config, registry)
        .sink(Arc::new(MemorySink::new()))
        .process_host(RecordingProcessHost::new())
        .build();
    host.start_system(&params).await.unwrap();

    let store = host.component::<TrackedInstance>(&key("data/store")).await.unwrap();
    assert_eq!(store.values["pool"]["size"], serde_json::json!(4));
    let server = host.component::<TrackedInstance>(&key("web/server")).await.unwrap();
    assert_eq!(server.values["port"], serde_json::json!(9000));

    host.stop_system().await;
    assert_eq!(tracker.stopped(), vec!["web/server", "data/store"]);
}

#[test]
fn test_json_and_toml_documents_are_equivalent() {
    let json = r#"{
        "params": { "pool-size": 4 },
        "components": [
            { "key": "web/server", "factory": "server",
              "config": { "store": { "ref": "data/store" }, "port": { "param": "port", "default": 3000 } } },
            { "key": "data/store", "factory": "store",
              "config": { "pool": { "size": { "param": "pool-size" } } } },
            { "key": "data/metrics", "factory": "store", "enabled": false }
        ]
    }"#;

    let from_json = SystemConfig::parse(json, crate::config::ConfigFormat::Json).unwrap();
    let from_toml = SystemConfig::parse(SYSTEM_TOML, crate::config::ConfigFormat::Toml).unwrap();
    assert_eq!(from_json, from_toml);
}
