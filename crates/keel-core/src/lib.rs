pub mod config;
pub mod event;
pub mod host;
pub mod kernel;
pub mod registry;
pub mod system;

// Re-export key public types for the binary and embedders
pub use config::{expand, ComponentSpec, ResolvedGraph, RuntimeParams, SystemConfig};
pub use event::{LifecycleEvent, LogFacadeSink, LogSink, MemorySink};
pub use host::{ProcessHost, TokioProcessHost};
pub use kernel::component::{BoxError, ComponentContext, ComponentKey, Instance};
pub use kernel::error::Error as KernelError;
pub use kernel::{HostState, HostStatus, LifecycleHost};
pub use registry::ComponentRegistry;
pub use system::{halt, init, HaltReport, LiveSystem};

// Shared test support and cross-module integration tests
#[cfg(test)]
mod tests;
