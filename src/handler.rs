//! # Worker handler abstraction and function-backed implementation.
//!
//! This module defines the [`Handler`] trait (the per-task transform executed
//! by the worker pool) and a convenient function-backed implementation
//! [`HandlerFn`]. The common handle type is [`HandlerRef`], an
//! `Arc<dyn Handler>` shared by every worker.
//!
//! A handler receives the id of the worker executing it and one task payload,
//! and returns the result to deliver downstream. It runs with no runner lock
//! held; its duration is unconstrained and may vary per call without affecting
//! delivery order.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

/// Shared handle to a worker handler (`Arc<dyn Handler>`).
pub type HandlerRef<T, R> = Arc<dyn Handler<T, R>>;

/// # Per-task transform executed by the worker pool.
///
/// Exactly one `run` call happens per admitted task, on whichever worker pulls
/// its slot first. There is no ordering guarantee between `run` calls; the
/// sequencer restores submission order downstream.
///
/// A panic inside `run` is captured by the worker and delivered to the
/// subscriber as [`TaskError::Panic`](crate::TaskError::Panic) at the task's
/// original position.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use taskline::Handler;
///
/// struct Double;
///
/// #[async_trait]
/// impl Handler<u64, u64> for Double {
///     async fn run(&self, _worker_id: usize, task: u64) -> u64 {
///         task * 2
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<T, R>: Send + Sync + 'static
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Executes one task and returns its result.
    ///
    /// `worker_id` identifies the execution unit (0..worker_count), useful for
    /// per-worker state or diagnostics.
    async fn run(&self, worker_id: usize, task: T) -> R;
}

/// Function-backed handler implementation.
///
/// Wraps a closure that *creates* a new future per task, so no shared mutable
/// state leaks between executions; share state explicitly via `Arc` inside the
/// closure if needed.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle.
    ///
    /// # Example
    /// ```
    /// use taskline::{HandlerFn, HandlerRef};
    ///
    /// let h: HandlerRef<u64, u64> = HandlerFn::arc(|_id, task: u64| async move { task + 1 });
    /// ```
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut, T, R> Handler<T, R> for HandlerFn<F>
where
    F: Fn(usize, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    T: Send + 'static,
    R: Send + 'static,
{
    async fn run(&self, worker_id: usize, task: T) -> R {
        (self.f)(worker_id, task).await
    }
}
