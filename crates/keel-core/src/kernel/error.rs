//! # Keel Core Kernel Errors
//!
//! Defines the top-level [`Error`] returned by the lifecycle host, together
//! with the smaller error types shared by the component vocabulary.
//!
//! Subsystem errors (configuration expansion, graph initialization) convert
//! into [`Error`] through `#[from]` so the host can use `?` across phases.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::kernel::component::BoxError;
use crate::system::error::InitError;

/// Errors surfaced by [`LifecycleHost`](crate::kernel::host::LifecycleHost).
#[derive(Debug, ThisError)]
pub enum Error {
    /// The configuration could not be expanded; no component was started.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A constructor failed; the started subset has already been rolled back.
    #[error(transparent)]
    Init(#[from] InitError),

    /// `start_system` was called while a system is running or starting.
    #[error("A system is already running")]
    AlreadyRunning,

    /// A stop arrived before the start finished; whatever was built has been
    /// halted.
    #[error("System start was interrupted before it completed")]
    Interrupted,

    /// A user supplied pre-start or pre-stop hook failed.
    #[error("Lifecycle hook failed during {phase}: {source}")]
    Hook {
        phase: LifecyclePhase,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Returns true for the single-instance rejection.
    pub fn is_already_running(&self) -> bool {
        matches!(self, Error::AlreadyRunning)
    }

    /// Returns true when a stop request cut the start short.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Interrupted)
    }
}

/// Represents a specific phase in the host's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum LifecyclePhase {
    #[error("PreStart")]
    PreStart,
    #[error("PreStop")]
    PreStop,
}

/// A component key literal that does not follow the `namespace/name` form.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("Invalid component key '{text}': {reason}")]
pub struct InvalidKey {
    pub text: String,
    pub reason: &'static str,
}

/// Failures while a constructor reads its bindings.
#[derive(Debug, ThisError)]
pub enum ContextError {
    #[error("Component '{component}' has no binding named '{binding}'")]
    MissingBinding { component: String, binding: String },

    #[error("Binding '{binding}' of component '{component}' is a {found}, expected a {expected}")]
    WrongBindingKind {
        component: String,
        binding: String,
        found: &'static str,
        expected: &'static str,
    },

    #[error("Dependency '{binding}' of component '{component}' is not a {expected}")]
    TypeMismatch {
        component: String,
        binding: String,
        expected: &'static str,
    },

    #[error("Value '{binding}' of component '{component}' could not be decoded: {source}")]
    InvalidValue {
        component: String,
        binding: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;
