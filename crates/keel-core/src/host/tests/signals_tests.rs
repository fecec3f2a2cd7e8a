use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::event::MemorySink;
use crate::host::{BoxFuture, ProcessHost, TokioProcessHost};

fn flag_hook(flag: Arc<AtomicBool>) -> crate::host::ShutdownHook {
    Box::new(move || -> BoxFuture<'static, ()> {
        Box::pin(async move {
            flag.store(true, Ordering::SeqCst);
        })
    })
}

#[test]
fn test_registration_outside_runtime_is_ignored() {
    let host = TokioProcessHost::new();
    let fired = Arc::new(AtomicBool::new(false));

    host.register_shutdown_hook(Arc::new(MemorySink::new()), flag_hook(fired.clone()));

    assert!(!host.is_terminated());
    assert!(!fired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_hook_waits_for_a_signal() {
    let host = TokioProcessHost::default();
    let fired = Arc::new(AtomicBool::new(false));
    let sink = Arc::new(MemorySink::new());

    host.register_shutdown_hook(sink.clone(), flag_hook(fired.clone()));

    let waited = tokio::time::timeout(Duration::from_millis(50), host.terminated()).await;
    assert!(waited.is_err(), "terminated() must not resolve without a signal");
    assert!(!fired.load(Ordering::SeqCst));
    assert!(sink.of_kind("shutdown-signal").is_empty());
}

#[test]
fn test_clones_share_termination_state() {
    let host = TokioProcessHost::new();
    let clone = host.clone();
    assert!(!host.is_terminated());
    assert!(!clone.is_terminated());
}
