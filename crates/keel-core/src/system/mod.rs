//! # Keel System
//!
//! Turning a [`ResolvedGraph`](crate::config::ResolvedGraph) into running
//! components and back.
//!
//! - [`init`] constructs components in start order and rolls back on failure.
//! - [`halt`] destructs them in exact reverse order, best effort.
pub mod error;
pub mod halt;
pub mod init;
pub mod live;

pub use error::{HaltError, InitError};
pub use halt::{halt, HaltOutcome, HaltReport};
pub use init::init;
pub use live::LiveSystem;
