//! # Keel Configuration
//!
//! Reading, merging and resolving system configurations.
//!
//! - [`SystemConfig`] / [`ComponentDecl`]: the raw declarative document, loaded
//!   from JSON, TOML or YAML.
//! - [`RuntimeParams`]: environment-specific overrides merged in at expansion.
//! - [`expand`]: turns the two into a [`ResolvedGraph`] of [`ComponentSpec`]s in
//!   start order.
pub mod document;
pub mod error;
pub mod expander;
pub mod graph;
pub mod params;

pub use document::{ComponentDecl, ConfigFormat, SystemConfig};
pub use error::ConfigError;
pub use expander::expand;
pub use graph::{Binding, ComponentSpec, DependencyGraph, ResolvedGraph};
pub use params::RuntimeParams;

// Test module declaration
#[cfg(test)]
mod tests;
