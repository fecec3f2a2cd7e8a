use std::sync::Arc;

use tokio::sync::watch;

use crate::event::{LifecycleEvent, LogSink};
use crate::host::crash::install_crash_interceptor;
use crate::host::{ProcessHost, ShutdownHook};

/// [`ProcessHost`] backed by tokio's signal handling and the std panic hook.
///
/// A registered shutdown hook runs on the first SIGINT or SIGTERM (Ctrl-C on
/// other platforms); [`terminated`](Self::terminated) resolves once it is done.
#[derive(Debug, Clone)]
pub struct TokioProcessHost {
    terminated: Arc<watch::Sender<bool>>,
}

impl Default for TokioProcessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TokioProcessHost {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            terminated: Arc::new(tx),
        }
    }

    /// Wait until a termination signal arrived and the shutdown hook finished.
    pub async fn terminated(&self) {
        let mut rx = self.terminated.subscribe();
        // Err only if the sender is gone, which cannot happen while `self` lives
        let _ = rx.wait_for(|done| *done).await;
    }

    pub fn is_terminated(&self) -> bool {
        *self.terminated.borrow()
    }
}

impl ProcessHost for TokioProcessHost {
    fn install_crash_interceptor(&self, sink: Arc<dyn LogSink>) {
        install_crash_interceptor(sink);
    }

    fn register_shutdown_hook(&self, sink: Arc<dyn LogSink>, hook: ShutdownHook) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("No tokio runtime available, shutdown hook not registered: {}", e);
                return;
            }
        };

        let terminated = self.terminated.clone();
        handle.spawn(async move {
            let signal = match termination_signal().await {
                Ok(signal) => signal,
                Err(e) => {
                    log::error!("Failed to listen for termination signals: {}", e);
                    return;
                }
            };
            sink.log(&LifecycleEvent::ShutdownSignal {
                signal: signal.to_string(),
            });
            hook().await;
            terminated.send_replace(true);
        });
        log::debug!("Registered shutdown hook for termination signals");
    }
}

#[cfg(unix)]
async fn termination_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn termination_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "ctrl-c")
}
