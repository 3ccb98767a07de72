//! Error types produced by supervised task functions.
//!
//! The supervision layer itself never fails: selection misses, double
//! start/stop and journal backpressure are not errors. The only error type is
//! [`TaskError`], returned by a [`Task`](crate::Task) execution and forwarded
//! to the runner's error handler.

use std::fmt::Display;

use thiserror::Error;

/// # Errors produced by task execution.
///
/// Every variant except [`TaskError::Canceled`] is reported to the error
/// handler of the runner; none of them stops the restart loop.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task execution failed; it will be restarted after the interval.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task function panicked; the panic was caught by the runner.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Task returned because it observed the stop signal.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use flockvisor::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.to_string(), "execution failed: connection refused");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use flockvisor::TaskError;
    ///
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Whether the error should reach the runner's error handler.
    ///
    /// A task returning [`TaskError::Canceled`] is exiting gracefully.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, TaskError::Canceled)
    }
}
