//! # Keel Core Kernel
//!
//! The `kernel` module holds the pieces every other subsystem builds on and the
//! top-level coordinator that ties them together.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Component Vocabulary**: [`ComponentKey`](component::ComponentKey), the
//!   [`Instance`](component::Instance) handle and the
//!   [`ComponentContext`](component::ComponentContext) handed to constructors,
//!   all found in the `component` submodule.
//! - **Lifecycle Host**: [`LifecycleHost`](host::LifecycleHost) owns the single
//!   current-system slot and drives expansion, initialization and halting.
//! - **Core Constants**: Provides crate-wide constants via the `constants` submodule.
//! - **Error Handling**: Defines the top-level [`Error`](error::Error) type and
//!   a `Result` alias in the `error` submodule.
pub mod component;
pub mod constants;
pub mod error;
pub mod host;

pub use component::{BoxError, ComponentContext, ComponentKey, Instance};
pub use error::{Error, LifecyclePhase, Result};
pub use host::{HostState, HostStatus, LifecycleHook, LifecycleHost, LifecycleHostBuilder};
