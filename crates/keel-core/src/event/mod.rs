//! # Keel Lifecycle Events
//!
//! The logging-sink side of the orchestrator: [`LifecycleEvent`] describes what
//! happened, a [`LogSink`] decides where it goes.
pub mod sink;
pub mod types;

pub use sink::{LogFacadeSink, LogSink, MemorySink};
pub use types::{CrashKind, LifecycleEvent};
