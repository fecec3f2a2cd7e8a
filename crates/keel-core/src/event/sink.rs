use std::sync::{Mutex, PoisonError};

use crate::event::types::LifecycleEvent;
use crate::kernel::constants::LIFECYCLE_LOG_TARGET;

/// Receives structured lifecycle and crash events.
///
/// Implementations may be called from a panicking thread and must not block.
pub trait LogSink: Send + Sync {
    fn log(&self, event: &LifecycleEvent);
}

/// Forwards events to the `log` facade as one JSON object per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacadeSink;

impl LogSink for LogFacadeSink {
    fn log(&self, event: &LifecycleEvent) {
        match serde_json::to_string(event) {
            Ok(line) => log::log!(target: LIFECYCLE_LOG_TARGET, event.level(), "{}", line),
            Err(e) => log::log!(
                target: LIFECYCLE_LOG_TARGET,
                event.level(),
                "{:?} (unserializable: {})",
                event,
                e
            ),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The `what` tags of the recorded events, in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(LifecycleEvent::kind).collect()
    }

    /// Recorded events matching `kind`.
    pub fn of_kind(&self, kind: &str) -> Vec<LifecycleEvent> {
        self.events().into_iter().filter(|e| e.kind() == kind).collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl LogSink for MemorySink {
    fn log(&self, event: &LifecycleEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
