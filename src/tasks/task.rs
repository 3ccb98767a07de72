//! # Task abstraction.
//!
//! Defines the [`Task`] trait: an async unit of work that runs until it is
//! done or told to stop. The common handle type is [`TaskRef`], an
//! `Arc<dyn Task>` shared between a managed task and its runner.
//!
//! A task receives a [`CancellationToken`] (the stop signal) and should
//! check it and return promptly once it is cancelled. The supervision layer
//! cannot preempt a task that ignores it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a task function.
pub type TaskRef = Arc<dyn Task>;

/// # Supervised unit of work.
///
/// The runner calls [`run`](Task::run) again after every return (success or
/// failure) until the stop signal fires. A task holds whatever state it needs
/// itself; the runner never inspects it.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use flockvisor::{Task, TaskError};
///
/// struct Poller;
///
/// #[async_trait]
/// impl Task for Poller {
///     async fn run(&self, stop: CancellationToken) -> Result<(), TaskError> {
///         if stop.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         // poll something...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Runs one execution until completion or until `stop` is cancelled.
    async fn run(&self, stop: CancellationToken) -> Result<(), TaskError>;
}
