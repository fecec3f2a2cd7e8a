//! # Keel System Errors
//!
//! Errors raised while constructing and destructing components.
//!
//! [`InitError`] is fatal for a start attempt and carries the report of the
//! rollback that already ran. [`HaltError`] is never returned on its own; it
//! is recorded inside a [`HaltReport`] so teardown can continue.
use thiserror::Error;

use crate::kernel::component::{BoxError, ComponentKey};
use crate::system::halt::HaltReport;

/// A constructor failed. Every component started before it has been halted.
#[derive(Debug, Error)]
#[error("Failed to start component '{key}': {source}")]
pub struct InitError {
    pub key: ComponentKey,
    #[source]
    pub source: BoxError,
    /// Outcome of halting the components that had already started
    pub rollback: HaltReport,
}

/// A destructor failed.
#[derive(Debug, Error)]
#[error("Failed to stop component '{key}': {source}")]
pub struct HaltError {
    pub key: ComponentKey,
    #[source]
    pub source: BoxError,
}
