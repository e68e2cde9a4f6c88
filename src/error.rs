//! Error types used by the taskline runtime and task execution.
//!
//! This module defines two error enums:
//!
//! - [`RunnerError`] — contract errors surfaced by the runner API itself.
//! - [`TaskError`] — faults captured from a single task execution.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! [`TaskResult`] is the payload type delivered to the subscriber: the handler's
//! value on success, or a captured fault in its place.

use thiserror::Error;

/// Outcome of one task execution, delivered to the subscriber in submission order.
///
/// A task whose handler panicked is delivered as `Err(TaskError::Panic)` at its
/// original position; surrounding tasks are unaffected.
pub type TaskResult<R> = Result<R, TaskError>;

/// # Errors produced by the runner API.
///
/// These represent contract violations at the call site, such as admitting a
/// task after [`Runner::close`](crate::Runner::close) or building a runner
/// without a worker handler.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The runner has been closed; no further admissions or subscriptions are accepted.
    #[error("runner is closed")]
    Closed,

    /// No worker handler was configured before `build()`.
    #[error("no worker handler configured")]
    InvalidHandler,

    /// Construction parameters are out of range (zero workers or zero capacity).
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Which parameter was rejected and why.
        reason: String,
    },
}

impl RunnerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskline::RunnerError;
    ///
    /// assert_eq!(RunnerError::Closed.as_label(), "runner_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerError::Closed => "runner_closed",
            RunnerError::InvalidHandler => "runner_invalid_handler",
            RunnerError::InvalidConfig { .. } => "runner_invalid_config",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RunnerError::Closed => "runner is closed".to_string(),
            RunnerError::InvalidHandler => "no worker handler configured".to_string(),
            RunnerError::InvalidConfig { reason } => format!("invalid configuration: {reason}"),
        }
    }
}

/// # Faults captured from task execution.
///
/// The worker pool isolates handler faults instead of letting them kill an
/// execution unit: a panicking handler becomes a [`TaskError::Panic`] stored in
/// the task's slot, and the pipeline keeps publishing in order.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The worker handler panicked while executing this task.
    #[error("worker handler panicked: {message}")]
    Panic {
        /// The panic payload, if it was a string; a placeholder otherwise.
        message: String,
    },
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskline::TaskError;
    ///
    /// let err = TaskError::Panic { message: "boom".into() };
    /// assert_eq!(err.as_label(), "task_panic");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Panic { .. } => "task_panic",
        }
    }

    /// Returns a human-readable message with details about the fault.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Panic { message } => format!("panic: {message}"),
        }
    }
}
