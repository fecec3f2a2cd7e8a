use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::tempdir;

use crate::config::document::{ComponentDecl, ConfigFormat, SystemConfig};
use crate::config::error::ConfigError;

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path(Path::new("system.json")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("system.TOML")), Some(ConfigFormat::Toml));
    assert_eq!(ConfigFormat::from_path(Path::new("system.yml")), Some(ConfigFormat::Yaml));
    assert_eq!(ConfigFormat::from_path(Path::new("system.ini")), None);
    assert_eq!(ConfigFormat::from_path(Path::new("system")), None);
    assert_eq!(ConfigFormat::Toml.extension(), "toml");
}

#[test]
fn test_declaration_defaults() {
    let config = SystemConfig::parse(
        r#"{ "components": [ { "key": "app/db" } ] }"#,
        ConfigFormat::Json,
    )
    .unwrap();

    let decl = &config.components[0];
    assert!(decl.enabled);
    assert!(decl.config.is_empty());
    assert_eq!(decl.factory_name(), "app/db");
    assert!(config.params.is_empty());
}

#[test]
fn test_parse_yaml() {
    let yaml = r#"
params:
  port: 8080
components:
  - key: app/db
    factory: postgres
    config:
      url: postgres://localhost
  - key: app/server
    config:
      db: { ref: app/db }
      port: { param: port }
"#;
    let config = SystemConfig::parse(yaml, ConfigFormat::Yaml).unwrap();

    let expected = SystemConfig::new()
        .with_param("port", json!(8080))
        .with_component(
            ComponentDecl::new("app/db")
                .with_factory("postgres")
                .with_value("url", json!("postgres://localhost")),
        )
        .with_component(
            ComponentDecl::new("app/server")
                .with_ref("db", "app/db")
                .with_param("port", "port", None),
        );
    assert_eq!(config, expected);
}

#[test]
fn test_unknown_fields_are_rejected() {
    let result = SystemConfig::parse(
        r#"{ "components": [ { "key": "app/db", "constructor": "x" } ] }"#,
        ConfigFormat::Json,
    );
    assert!(matches!(result, Err(ConfigError::Parse { format: "JSON", .. })));
}

#[test]
fn test_load_reports_io_and_format_errors() {
    let dir = tempdir().expect("Failed to create temporary directory");

    let missing = dir.path().join("missing.toml");
    assert!(matches!(SystemConfig::load(&missing), Err(ConfigError::Io { .. })));

    let unsupported = dir.path().join("system.ini");
    fs::write(&unsupported, "").unwrap();
    assert!(matches!(
        SystemConfig::load(&unsupported),
        Err(ConfigError::UnsupportedFormat { .. })
    ));

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "[[components]\nkey = ").unwrap();
    assert!(matches!(
        SystemConfig::load(&broken),
        Err(ConfigError::Parse { format: "TOML", .. })
    ));
}

#[test]
fn test_json_export_reloads() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("system.json");

    let config = SystemConfig::new()
        .with_param("port", json!(80))
        .with_component(ComponentDecl::new("app/db").disabled())
        .with_component(ComponentDecl::new("app/server").with_param("port", "port", Some(json!(8080))));
    fs::write(&path, config.to_json().unwrap()).unwrap();

    let reloaded = SystemConfig::load(&path).unwrap();
    assert_eq!(reloaded, config);
    assert_eq!(reloaded.enabled_components().count(), 1);
}
