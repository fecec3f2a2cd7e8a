use serde::{Deserialize, Serialize};

/// Marker carried by crash events so consumers can filter them without
/// matching on the event tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrashKind {
    BackgroundThreadCrash,
}

/// Structured events emitted while bringing a system up and down.
///
/// Serialized as `{"what": "<event-kind>", ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "what", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum LifecycleEvent {
    /// Expansion succeeded and construction is about to begin
    SystemStarting { components: usize },
    /// A constructor is about to run
    ComponentStarting { key: String, factory: String },
    /// A constructor returned successfully
    ComponentStarted { key: String },
    /// A constructor failed
    ComponentStartFailed { key: String, error: String },
    /// Tearing down the components that started before a failure
    RollbackStarted { failed: String, started: usize },
    /// Every component is live
    SystemStarted { components: Vec<String> },
    /// A start attempt was abandoned
    SystemStartFailed { error: String },
    /// Halting is about to begin
    SystemStopping { components: usize },
    /// A destructor returned successfully
    ComponentStopped { key: String },
    /// The component has no destructor
    ComponentStopSkipped { key: String },
    /// A destructor failed; teardown continues
    ComponentStopFailed { key: String, error: String },
    /// Halting finished
    SystemStopped { stopped: usize, skipped: usize, failed: usize },
    /// The process host delivered a termination signal
    ShutdownSignal { signal: String },
    /// A non-orchestrator thread panicked
    UncaughtException {
        kind: CrashKind,
        thread_name: String,
        error: String,
    },
}

impl LifecycleEvent {
    /// Crash event for a panic on `thread_name`.
    pub fn background_crash(thread_name: impl Into<String>, error: impl Into<String>) -> Self {
        LifecycleEvent::UncaughtException {
            kind: CrashKind::BackgroundThreadCrash,
            thread_name: thread_name.into(),
            error: error.into(),
        }
    }

    /// The `what` tag of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleEvent::SystemStarting { .. } => "system-starting",
            LifecycleEvent::ComponentStarting { .. } => "component-starting",
            LifecycleEvent::ComponentStarted { .. } => "component-started",
            LifecycleEvent::ComponentStartFailed { .. } => "component-start-failed",
            LifecycleEvent::RollbackStarted { .. } => "rollback-started",
            LifecycleEvent::SystemStarted { .. } => "system-started",
            LifecycleEvent::SystemStartFailed { .. } => "system-start-failed",
            LifecycleEvent::SystemStopping { .. } => "system-stopping",
            LifecycleEvent::ComponentStopped { .. } => "component-stopped",
            LifecycleEvent::ComponentStopSkipped { .. } => "component-stop-skipped",
            LifecycleEvent::ComponentStopFailed { .. } => "component-stop-failed",
            LifecycleEvent::SystemStopped { .. } => "system-stopped",
            LifecycleEvent::ShutdownSignal { .. } => "shutdown-signal",
            LifecycleEvent::UncaughtException { .. } => "uncaught-exception",
        }
    }

    /// Log level the event should be reported at.
    pub fn level(&self) -> log::Level {
        match self {
            LifecycleEvent::ComponentStartFailed { .. }
            | LifecycleEvent::SystemStartFailed { .. }
            | LifecycleEvent::ComponentStopFailed { .. }
            | LifecycleEvent::UncaughtException { .. } => log::Level::Error,
            LifecycleEvent::RollbackStarted { .. } | LifecycleEvent::ShutdownSignal { .. } => log::Level::Warn,
            LifecycleEvent::ComponentStarting { .. } | LifecycleEvent::ComponentStopSkipped { .. } => {
                log::Level::Debug
            }
            _ => log::Level::Info,
        }
    }

    /// The component this event is about, if any.
    pub fn component(&self) -> Option<&str> {
        match self {
            LifecycleEvent::ComponentStarting { key, .. }
            | LifecycleEvent::ComponentStarted { key }
            | LifecycleEvent::ComponentStartFailed { key, .. }
            | LifecycleEvent::ComponentStopped { key }
            | LifecycleEvent::ComponentStopSkipped { key }
            | LifecycleEvent::ComponentStopFailed { key, .. } => Some(key),
            _ => None,
        }
    }
}
