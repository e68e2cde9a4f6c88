//! Builder for constructing a [`Runner`].

use std::future::Future;
use std::sync::Arc;

use crate::config::RunnerConfig;
use crate::error::RunnerError;
use crate::handler::{HandlerFn, HandlerRef};

use super::core::Runner;

/// Builder for constructing a [`Runner`] from a configuration and a handler.
///
/// The handler is mandatory: [`build`](RunnerBuilder::build) fails with
/// [`RunnerError::InvalidHandler`] without one, and with
/// [`RunnerError::InvalidConfig`] if the configuration bounds are zero.
pub struct RunnerBuilder<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    cfg: RunnerConfig,
    handler: Option<HandlerRef<T, R>>,
}

impl<T, R> RunnerBuilder<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: RunnerConfig) -> Self {
        Self { cfg, handler: None }
    }

    /// Sets the worker handler.
    pub fn with_handler(mut self, handler: HandlerRef<T, R>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Sets the worker handler from a closure.
    ///
    /// Shorthand for `with_handler(HandlerFn::arc(f))`.
    ///
    /// # Example
    /// ```
    /// use taskline::{Runner, RunnerConfig};
    ///
    /// let runner = Runner::<u64, u64>::builder(RunnerConfig::default())
    ///     .with_handler_fn(|_worker_id, task| async move { task + 1 })
    ///     .build()
    ///     .unwrap();
    /// # drop(runner);
    /// ```
    pub fn with_handler_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn(usize, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        self.with_handler(HandlerFn::arc(f))
    }

    /// Validates the configuration and builds the runner.
    ///
    /// All slots, queues, and permits are allocated here, once, for the
    /// runner's entire lifetime. The pipeline loops are spawned later, by the
    /// first [`subscribe`](Runner::subscribe).
    pub fn build(self) -> Result<Arc<Runner<T, R>>, RunnerError> {
        self.cfg.validate()?;
        let handler = self.handler.ok_or(RunnerError::InvalidHandler)?;
        Ok(Runner::new_internal(self.cfg, handler))
    }
}
