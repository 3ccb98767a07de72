//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait for implementing async cancelable task functions
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`ManagedTask`] - named task that can be started and stopped repeatedly
//! - [`TaskId`] - stable handle of a managed task

mod managed;
mod task;
mod task_fn;

pub use managed::{ManagedTask, TaskId};
pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
