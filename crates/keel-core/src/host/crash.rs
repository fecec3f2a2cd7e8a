//! Forwarding of panics on background threads to a [`LogSink`].
//!
//! The interceptor is a process-wide panic hook, installed at most once and
//! chained onto whatever hook was present before. Panics on the main thread go
//! to the previous hook unchanged.
use std::any::Any;
use std::panic::{self, PanicHookInfo};
use std::sync::{Arc, Once, RwLock};
use std::thread;

use crate::event::{LifecycleEvent, LogSink};
use crate::kernel::constants::MAIN_THREAD_NAME;

static HOOK: Once = Once::new();
static CRASH_SINK: RwLock<Option<Arc<dyn LogSink>>> = RwLock::new(None);

/// Route background-thread panics to `sink`.
///
/// Calling this again replaces the sink; the hook itself is installed once.
pub fn install_crash_interceptor(sink: Arc<dyn LogSink>) {
    match CRASH_SINK.write() {
        Ok(mut slot) => *slot = Some(sink),
        Err(poisoned) => *poisoned.into_inner() = Some(sink),
    }

    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let current = thread::current();
            let thread_name = current.name().unwrap_or("<unnamed>");
            if thread_name == MAIN_THREAD_NAME || !forward(thread_name, info) {
                previous(info);
            }
        }));
        log::debug!("Installed background crash interceptor");
    });
}

/// Returns false when no sink could be reached without blocking.
fn forward(thread_name: &str, info: &PanicHookInfo<'_>) -> bool {
    let Ok(slot) = CRASH_SINK.try_read() else {
        return false;
    };
    let Some(sink) = slot.as_ref() else {
        return false;
    };

    let mut error = panic_message(info.payload());
    if let Some(location) = info.location() {
        error = format!("{} at {}:{}", error, location.file(), location.line());
    }
    sink.log(&LifecycleEvent::background_crash(thread_name, error));
    true
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
