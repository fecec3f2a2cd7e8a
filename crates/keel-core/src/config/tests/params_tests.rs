use serde_json::json;

use crate::config::error::ConfigError;
use crate::config::params::RuntimeParams;

#[test]
fn test_from_pairs_keeps_json_types() {
    let params = RuntimeParams::from_pairs(["port=9000", "debug=true", "name=primary", "hosts=[\"a\",\"b\"]", "empty="])
        .unwrap();

    assert_eq!(params.get("port"), Some(&json!(9000)));
    assert_eq!(params.get("debug"), Some(&json!(true)));
    assert_eq!(params.get("name"), Some(&json!("primary")));
    assert_eq!(params.get("hosts"), Some(&json!(["a", "b"])));
    assert_eq!(params.get("empty"), Some(&json!("")));
    assert_eq!(params.len(), 5);
}

#[test]
fn test_from_pairs_rejects_malformed_pairs() {
    assert!(matches!(
        RuntimeParams::from_pairs(["port"]),
        Err(ConfigError::InvalidParam { reason: "expected name=value", .. })
    ));
    assert!(matches!(
        RuntimeParams::from_pairs(["=1"]),
        Err(ConfigError::InvalidParam { reason: "param name is empty", .. })
    ));
}

#[test]
fn test_from_vars_strips_prefix_and_normalizes_names() {
    let vars = vec![
        ("KEEL_DB_URL".to_string(), "postgres://db".to_string()),
        ("KEEL_PORT".to_string(), "8080".to_string()),
        ("KEEL_".to_string(), "ignored".to_string()),
        ("HOME".to_string(), "/root".to_string()),
    ];
    let params = RuntimeParams::from_vars("KEEL_", vars);

    assert_eq!(params.get("db-url"), Some(&json!("postgres://db")));
    assert_eq!(params.get("port"), Some(&json!(8080)));
    assert_eq!(params.len(), 2);
}

#[cfg(unix)]
#[test]
fn test_from_os_vars_skips_non_unicode_entries() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let vars = vec![
        (OsString::from("KEEL_PORT"), OsString::from("8080")),
        (OsString::from("KEEL_TOKEN"), OsString::from_vec(vec![0xff, 0xfe])),
        (OsString::from_vec(vec![b'K', b'E', b'E', b'L', b'_', 0xff]), OsString::from("x")),
        (OsString::from("LANG_BYTES"), OsString::from_vec(vec![0xc3, 0x28])),
    ];
    let params = RuntimeParams::from_os_vars("KEEL_", vars);

    assert_eq!(params.get("port"), Some(&json!(8080)));
    assert!(!params.contains("token"));
    assert_eq!(params.len(), 1);
}

#[test]
fn test_merge_prefers_other() {
    let mut base = RuntimeParams::new().with("port", json!(80)).with("host", json!("localhost"));
    let overrides = RuntimeParams::new().with("port", json!(8080));

    base.merge(&overrides);
    assert_eq!(base.get("port"), Some(&json!(8080)));
    assert_eq!(base.get("host"), Some(&json!("localhost")));
}
