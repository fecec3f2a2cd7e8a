//! # Keel Process Host
//!
//! Capabilities the surrounding process provides to the lifecycle host:
//! running a hook when the process is asked to terminate, and intercepting
//! panics on background threads. [`TokioProcessHost`] is the default
//! implementation; tests and embedders can supply their own [`ProcessHost`].
pub mod crash;
pub mod signals;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::event::LogSink;

pub use crash::install_crash_interceptor;
pub use signals::TokioProcessHost;

/// Boxed future returned by a [`ShutdownHook`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Callback run once when the process receives a termination signal.
pub type ShutdownHook = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

pub trait ProcessHost: Send + Sync {
    /// Forward panics on non-main threads to `sink` as crash events.
    fn install_crash_interceptor(&self, sink: Arc<dyn LogSink>);

    /// Run `hook` when a termination signal is delivered. `sink` receives the
    /// signal notification.
    fn register_shutdown_hook(&self, sink: Arc<dyn LogSink>, hook: ShutdownHook);
}

// Test module declaration
#[cfg(test)]
mod tests;
