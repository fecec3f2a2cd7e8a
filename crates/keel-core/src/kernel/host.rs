use std::any::Any;
use std::mem;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;

use crate::config::{expand, RuntimeParams, SystemConfig};
use crate::event::{LifecycleEvent, LogFacadeSink, LogSink};
use crate::host::{BoxFuture, ProcessHost, TokioProcessHost};
use crate::kernel::component::{BoxError, ComponentKey};
use crate::kernel::constants;
use crate::kernel::error::{Error, LifecyclePhase, Result};
use crate::registry::ComponentRegistry;
use crate::system::{halt, init, HaltReport, LiveSystem};

/// Hook run before a start or stop. Returning an error from the pre-start hook
/// aborts the start; a pre-stop error is logged and the stop proceeds.
pub type LifecycleHook = Arc<dyn Fn() -> std::result::Result<(), BoxError> + Send + Sync>;

/// Observable state of a [`LifecycleHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Stopped,
    Starting,
    Running,
}

/// Snapshot returned by [`LifecycleHost::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStatus {
    pub state: HostState,
    /// Running components in start order; empty unless `Running`
    pub components: Vec<ComponentKey>,
}

/// Contents of the current-system slot.
enum Slot {
    Empty,
    /// A start is in progress; no second start may begin. A stop that arrives
    /// meanwhile sets `stop_requested` and the start halts instead of publishing.
    Starting { stop_requested: bool },
    Running(LiveSystem),
}

/// Resets a `Starting` slot that was never resolved, e.g. when a constructor
/// panicked.
struct StartGuard<'a> {
    slot: &'a Mutex<Slot>,
    armed: bool,
}

impl StartGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.slot.try_lock() {
            Ok(mut slot) => {
                *slot = Slot::Empty;
                log::error!("System start was abandoned; components built so far were not destructed");
            }
            Err(_) => log::error!("System start was abandoned while the slot was locked; host left starting"),
        }
    }
}

/// Owns the single current system and coordinates starting and stopping it.
pub struct LifecycleHost {
    this: Weak<LifecycleHost>,
    config: SystemConfig,
    registry: Arc<ComponentRegistry>,
    sink: Arc<dyn LogSink>,
    process: Option<Arc<dyn ProcessHost>>,
    pre_start: Option<LifecycleHook>,
    pre_stop: Option<LifecycleHook>,
    slot: Mutex<Slot>,
    process_hooks_installed: AtomicBool,
}

impl LifecycleHost {
    pub fn builder(config: SystemConfig, registry: impl Into<Arc<ComponentRegistry>>) -> LifecycleHostBuilder {
        LifecycleHostBuilder::new(config, registry.into())
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Expand the configuration, construct every component and publish the
    /// resulting system.
    ///
    /// Fails with [`Error::AlreadyRunning`] while another system is running or
    /// starting, and with [`Error::Interrupted`] when a stop was requested
    /// before construction finished. On any failure the host is left stopped
    /// with nothing running.
    ///
    /// Construction runs on its own task: dropping the returned future does not
    /// abandon the start, the system is still published (or rolled back). A
    /// panicking constructor is propagated to the caller and the host is reset
    /// to stopped; components it had already built are not destructed.
    pub async fn start_system(self: &Arc<Self>, params: &RuntimeParams) -> Result<()> {
        {
            let mut slot = self.slot.lock().await;
            if !matches!(*slot, Slot::Empty) {
                log::warn!("Rejected start: a system is already running");
                return Err(Error::AlreadyRunning);
            }
            *slot = Slot::Starting { stop_requested: false };
        }

        self.install_process_hooks();
        log::info!("Starting {} v{} system", constants::APP_NAME, constants::APP_VERSION);

        match tokio::spawn(self.clone().run_start(params.clone())).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => panic::resume_unwind(e.into_panic()),
            Err(e) => {
                log::error!("System start task did not complete: {}", e);
                Err(Error::Interrupted)
            }
        }
    }

    async fn run_start(self: Arc<Self>, params: RuntimeParams) -> Result<()> {
        let mut guard = StartGuard {
            slot: &self.slot,
            armed: true,
        };
        let outcome = self.bring_up(&params).await;

        let mut slot = self.slot.lock().await;
        let stop_requested = matches!(*slot, Slot::Starting { stop_requested: true });
        let system = match outcome {
            Ok(system) if !stop_requested => {
                let components: Vec<String> = system.started().iter().map(ToString::to_string).collect();
                *slot = Slot::Running(system);
                guard.disarm();
                drop(slot);

                log::info!("System started with {} component(s)", components.len());
                self.sink.log(&LifecycleEvent::SystemStarted { components });
                return Ok(());
            }
            Ok(system) => system,
            Err(e) => {
                *slot = Slot::Empty;
                guard.disarm();
                drop(slot);

                log::error!("System failed to start: {}", e);
                self.sink.log(&LifecycleEvent::SystemStartFailed { error: e.to_string() });
                return Err(e);
            }
        };

        // A stop arrived while components were being built
        self.run_pre_stop_hook();
        *slot = Slot::Empty;
        guard.disarm();
        drop(slot);

        log::warn!("Stop requested during start, halting {} component(s)", system.len());
        let report = self.halt_system(system).await;
        let error = Error::Interrupted;
        self.sink.log(&LifecycleEvent::SystemStartFailed {
            error: format!("{} ({} component(s) halted)", error, report.len()),
        });
        Err(error)
    }

    async fn bring_up(&self, params: &RuntimeParams) -> Result<LiveSystem> {
        if let Some(hook) = &self.pre_start {
            hook().map_err(|source| Error::Hook {
                phase: LifecyclePhase::PreStart,
                source,
            })?;
        }

        let graph = expand(&self.config, params, &self.registry)?;
        let system = init(graph, self.sink.as_ref()).await?;
        Ok(system)
    }

    /// Halt the running system, if any, and leave the slot empty.
    ///
    /// Stopping when nothing is running is a no-op returning an empty report.
    /// Stopping while a start is in progress makes that start halt what it
    /// built instead of publishing it; this call then returns an empty report.
    pub async fn stop_system(&self) -> HaltReport {
        // Halt exactly the system taken out of the slot here
        let system = {
            let mut slot = self.slot.lock().await;
            match &mut *slot {
                Slot::Empty => {
                    log::debug!("Stop requested but no system is running");
                    return HaltReport::default();
                }
                Slot::Starting { stop_requested } => {
                    log::info!("Stop requested while starting; the start will be rolled back");
                    *stop_requested = true;
                    return HaltReport::default();
                }
                Slot::Running(_) => {}
            }

            self.run_pre_stop_hook();
            match mem::replace(&mut *slot, Slot::Empty) {
                Slot::Running(system) => system,
                other => {
                    *slot = other;
                    return HaltReport::default();
                }
            }
        };

        self.halt_system(system).await
    }

    fn run_pre_stop_hook(&self) {
        if let Some(hook) = &self.pre_stop {
            if let Err(e) = hook() {
                log::error!("{}", Error::Hook {
                    phase: LifecyclePhase::PreStop,
                    source: e,
                });
            }
        }
    }

    async fn halt_system(&self, system: LiveSystem) -> HaltReport {
        log::info!("Stopping system with {} component(s)", system.len());
        let report = halt(system, self.sink.as_ref()).await;
        if report.is_clean() {
            log::info!("System stopped");
        } else {
            log::warn!("System stopped with {} destructor failure(s)", report.failed_count());
        }
        report
    }

    /// Stop the running system (if any) and start a freshly constructed one.
    pub async fn restart_system(self: &Arc<Self>, params: &RuntimeParams) -> Result<HaltReport> {
        let report = self.stop_system().await;
        self.start_system(params).await?;
        Ok(report)
    }

    pub async fn status(&self) -> HostStatus {
        match &*self.slot.lock().await {
            Slot::Empty => HostStatus {
                state: HostState::Stopped,
                components: Vec::new(),
            },
            Slot::Starting { .. } => HostStatus {
                state: HostState::Starting,
                components: Vec::new(),
            },
            Slot::Running(system) => HostStatus {
                state: HostState::Running,
                components: system.started().to_vec(),
            },
        }
    }

    pub async fn is_running(&self) -> bool {
        matches!(*self.slot.lock().await, Slot::Running(_))
    }

    /// Get a running component by key, downcast to its concrete type.
    pub async fn component<T: Any + Send + Sync>(&self, key: &ComponentKey) -> Option<Arc<T>> {
        match &*self.slot.lock().await {
            Slot::Running(system) => system.get_concrete::<T>(key),
            _ => None,
        }
    }

    /// Install the crash interceptor and the shutdown hook, once per host.
    fn install_process_hooks(&self) {
        let Some(process) = &self.process else {
            return;
        };
        if self.process_hooks_installed.swap(true, Ordering::SeqCst) {
            return;
        }

        process.install_crash_interceptor(self.sink.clone());

        let host = self.this.clone();
        process.register_shutdown_hook(
            self.sink.clone(),
            Box::new(move || -> BoxFuture<'static, ()> {
                Box::pin(async move {
                    if let Some(host) = host.upgrade() {
                        let report = host.stop_system().await;
                        log::info!("Shutdown hook halted {} component(s)", report.len());
                    }
                })
            }),
        );
    }
}

/// Builder for [`LifecycleHost`].
pub struct LifecycleHostBuilder {
    config: SystemConfig,
    registry: Arc<ComponentRegistry>,
    sink: Arc<dyn LogSink>,
    process: Option<Arc<dyn ProcessHost>>,
    pre_start: Option<LifecycleHook>,
    pre_stop: Option<LifecycleHook>,
}

impl LifecycleHostBuilder {
    fn new(config: SystemConfig, registry: Arc<ComponentRegistry>) -> Self {
        Self {
            config,
            registry,
            sink: Arc::new(LogFacadeSink),
            process: Some(Arc::new(TokioProcessHost::new())),
            pre_start: None,
            pre_stop: None,
        }
    }

    /// Where lifecycle events go. Defaults to [`LogFacadeSink`].
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Process capabilities. Defaults to a [`TokioProcessHost`].
    pub fn process_host(mut self, process: Arc<dyn ProcessHost>) -> Self {
        self.process = Some(process);
        self
    }

    /// Do not install a crash interceptor or shutdown hook.
    pub fn without_process_host(mut self) -> Self {
        self.process = None;
        self
    }

    pub fn pre_start<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.pre_start = Some(Arc::new(hook));
        self
    }

    pub fn pre_stop<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.pre_stop = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Arc<LifecycleHost> {
        Arc::new_cyclic(|this| LifecycleHost {
            this: this.clone(),
            config: self.config,
            registry: self.registry,
            sink: self.sink,
            process: self.process,
            pre_start: self.pre_start,
            pre_stop: self.pre_stop,
            slot: Mutex::new(Slot::Empty),
            process_hooks_installed: AtomicBool::new(false),
        })
    }
}
