/// Application name
pub const APP_NAME: &str = "Keel";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log target used for structured lifecycle events
pub const LIFECYCLE_LOG_TARGET: &str = "keel::lifecycle";

/// Separator between a component key's namespace and name
pub const KEY_SEPARATOR: char = '/';

/// Default prefix for runtime parameters read from the environment
pub const DEFAULT_ENV_PREFIX: &str = "KEEL_";

/// Name the standard library gives the process' main thread
pub const MAIN_THREAD_NAME: &str = "main";
