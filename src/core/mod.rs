//! Runtime core: supervision loops and the registry.
//!
//! The public API from this module is [`supervise`] / [`supervise_named`]
//! (with their [`StopHandle`]) and the [`Registry`].
//!
//! Internal modules:
//! - [`runner`]: restart-on-exit loop of one task function, idempotent stop;
//! - [`registry`]: set of managed tasks, bulk land/raise, journal emission.

mod registry;
mod runner;

pub use registry::Registry;
pub use runner::{ErrorHandler, StopHandle, supervise, supervise_named};
