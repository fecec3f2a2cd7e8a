use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    fn label(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "JSON",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "YAML",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "TOML",
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// One component declaration as written in a configuration document.
///
/// Each entry of `config` is either a literal, a reference `{ "ref": "ns/name" }`
/// to another declared component, or a param placeholder
/// `{ "param": "name", "default": ... }` filled in at expansion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentDecl {
    /// Textual component key (`namespace/name` or `name`)
    pub key: String,
    /// Registry entry to build the component with; defaults to `key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<String>,
    /// Disabled declarations are dropped before resolution
    #[serde(default = "default_enabled", skip_serializing_if = "is_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, Value>,
}

impl ComponentDecl {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            factory: None,
            enabled: true,
            config: BTreeMap::new(),
        }
    }

    pub fn with_factory(mut self, factory: impl Into<String>) -> Self {
        self.factory = Some(factory.into());
        self
    }

    /// Bind a literal value.
    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.config.insert(name.into(), value);
        self
    }

    /// Bind a reference to another component.
    pub fn with_ref(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.config.insert(name.into(), json!({ "ref": target.into() }));
        self
    }

    /// Bind a runtime param, with an optional fallback.
    pub fn with_param(mut self, name: impl Into<String>, param: impl Into<String>, default: Option<Value>) -> Self {
        let placeholder = match default {
            Some(default) => json!({ "param": param.into(), "default": default }),
            None => json!({ "param": param.into() }),
        };
        self.config.insert(name.into(), placeholder);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Name of the registry entry that builds this component.
    pub fn factory_name(&self) -> &str {
        self.factory.as_deref().unwrap_or(&self.key)
    }
}

/// A raw system configuration: default params plus an ordered list of
/// component declarations. Declaration order is the tie-break for start order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SystemConfig {
    /// Default values for runtime params
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
    #[serde(default)]
    pub components: Vec<ComponentDecl>,
}

impl SystemConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a default param value.
    pub fn with_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Append a component declaration.
    pub fn with_component(mut self, decl: ComponentDecl) -> Self {
        self.components.push(decl);
        self
    }

    /// Parse configuration text in the given format.
    pub fn parse(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let parse_error = |source: crate::kernel::component::BoxError| ConfigError::Parse {
            format: format.label(),
            source,
        };

        match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| parse_error(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| parse_error(Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| parse_error(Box::new(e))),
        }
    }

    /// Load a configuration file, choosing the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("Loading {} configuration from {}", format.label(), path.display());
        Self::parse(&data, format)
    }

    /// Serialize the configuration as pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            format: ConfigFormat::Json.label(),
            source: Box::new(e),
        })
    }

    /// Declarations that take part in expansion.
    pub fn enabled_components(&self) -> impl Iterator<Item = &ComponentDecl> {
        self.components.iter().filter(|decl| decl.enabled)
    }
}
