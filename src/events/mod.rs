//! Registry journal: action records and the bounded channel carrying them.
//!
//! ## Contents
//! - [`ActionKind`], [`Action`] classification and payload of a journaled operation
//! - [`Journal`] thin wrapper over `tokio::sync::mpsc` with a backpressure policy
//!
//! ## Quick reference
//! - **Publisher**: [`Registry`](crate::Registry), from inside the call that caused the action.
//! - **Consumer**: whoever called [`Registry::journal`](crate::Registry::journal).

mod action;
mod journal;

pub use action::{Action, ActionKind};
pub(crate) use journal::Journal;
