//! # Runner configuration.
//!
//! Provides [`RunnerConfig`], the construction-time settings for a
//! [`Runner`](crate::Runner).
//!
//! Both fields bound fixed resources that live for the runner's entire
//! lifetime: the worker pool size and the slot ring capacity. Neither can be
//! resized after construction, so zero values are rejected up front by
//! [`RunnerConfig::validate`] instead of surfacing later as a stuck pipeline.

use crate::error::RunnerError;

/// Construction-time configuration for the runner.
///
/// ## Field semantics
/// - `worker_count`: number of parallel execution units pulling from the
///   dispatch queue. More workers increase throughput for slow handlers but
///   never affect delivery order.
/// - `max_pending`: capacity of the slot ring, i.e. the maximum number of
///   tasks admitted but not yet delivered. This is the backpressure bound:
///   once `max_pending` tasks are outstanding, `add_task` waits until a
///   delivery completes.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Number of parallel workers (must be ≥ 1).
    pub worker_count: usize,

    /// Maximum number of admitted-but-undelivered tasks (must be ≥ 1).
    ///
    /// Also sizes the dispatch and output queues, so every internal queue can
    /// hold the full set of outstanding work without blocking a role that
    /// holds no lock.
    pub max_pending: usize,
}

impl RunnerConfig {
    /// Checks that both bounds are positive.
    ///
    /// Returns [`RunnerError::InvalidConfig`] naming the offending field.
    ///
    /// # Example
    /// ```
    /// use taskline::RunnerConfig;
    ///
    /// let cfg = RunnerConfig { worker_count: 0, ..RunnerConfig::default() };
    /// assert!(cfg.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), RunnerError> {
        if self.worker_count == 0 {
            return Err(RunnerError::InvalidConfig {
                reason: "worker_count must be at least 1".to_string(),
            });
        }
        if self.max_pending == 0 {
            return Err(RunnerError::InvalidConfig {
                reason: "max_pending must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for RunnerConfig {
    /// Default configuration:
    ///
    /// - `worker_count = 4`
    /// - `max_pending = 1024`
    fn default() -> Self {
        Self {
            worker_count: 4,
            max_pending: 1024,
        }
    }
}
