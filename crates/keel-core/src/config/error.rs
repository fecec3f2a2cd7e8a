//! # Keel Configuration Errors
//!
//! Defines [`ConfigError`], covering everything that can go wrong between
//! reading a configuration document and producing a
//! [`ResolvedGraph`](crate::config::ResolvedGraph). Every variant is raised
//! before any component is constructed.
use std::path::PathBuf;

use thiserror::Error;

use crate::kernel::component::BoxError;
use crate::kernel::error::InvalidKey;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    InvalidKey(#[from] InvalidKey),

    #[error("Component '{key}' is declared more than once")]
    DuplicateKey { key: String },

    #[error("Component '{component}' uses factory '{factory}' which is not registered")]
    UnknownFactory { component: String, factory: String },

    #[error("Binding '{binding}' of component '{component}' refers to undeclared component '{target}'")]
    UndeclaredReference {
        component: String,
        binding: String,
        target: String,
    },

    #[error("Binding '{binding}' of component '{component}' refers to disabled component '{target}'")]
    DisabledReference {
        component: String,
        binding: String,
        target: String,
    },

    #[error("Binding '{binding}' of component '{component}' needs param '{param}' which has no value or default")]
    MissingParam {
        component: String,
        binding: String,
        param: String,
    },

    #[error("Binding '{binding}' of component '{component}' is malformed: {reason}")]
    MalformedBinding {
        component: String,
        binding: String,
        reason: String,
    },

    #[error("Invalid runtime param '{text}': {reason}")]
    InvalidParam { text: String, reason: &'static str },

    #[error("Dependency cycle detected: {}", cycle.join(" -> "))]
    DependencyCycle { cycle: Vec<String> },

    #[error("Unknown or unsupported config format for path: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} configuration: {source}")]
    Parse {
        format: &'static str,
        #[source]
        source: BoxError,
    },
}

impl ConfigError {
    /// Returns true when expansion was rejected because of a dependency cycle.
    pub fn is_cycle(&self) -> bool {
        matches!(self, ConfigError::DependencyCycle { .. })
    }
}
