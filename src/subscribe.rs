//! # Subscriber trait and function-backed implementation.
//!
//! `Subscribe` is the single delivery point of the pipeline: the consumer loop
//! invokes it once per task, strictly in submission order.
//!
//! ## Contract
//! - Invocations are **serialized**: `on_result` is never called concurrently
//!   with itself. A slow subscriber delays subsequent deliveries and delays
//!   the release of admission capacity, but never reorders results.
//! - Panics inside the subscriber are **not** caught by the consumer; they are
//!   the caller's responsibility.
//! - Exactly one subscriber is active at a time; registering another replaces
//!   it between deliveries.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskResult;

/// Shared handle to a subscriber (`Arc<dyn Subscribe>`).
pub type SubscribeRef<R> = Arc<dyn Subscribe<R>>;

/// Contract for the result subscriber.
///
/// Called from the consumer loop. Implementations should avoid blocking the
/// async runtime (prefer async I/O and cooperative waits); any time spent here
/// directly backpressures the producer.
#[async_trait]
pub trait Subscribe<R>: Send + Sync + 'static
where
    R: Send + 'static,
{
    /// Handles one delivered result.
    ///
    /// Results arrive in exactly `add_task` order; a task whose handler
    /// panicked arrives as `Err` at its original position.
    async fn on_result(&self, result: TaskResult<R>);
}

/// Function-backed subscriber implementation.
///
/// Wraps a closure that *creates* a new future per delivery.
#[derive(Debug)]
pub struct SubscribeFn<F> {
    f: F,
}

impl<F> SubscribeFn<F> {
    /// Creates a new function-backed subscriber.
    ///
    /// Prefer [`SubscribeFn::arc`] when you immediately need a [`SubscribeRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the subscriber and returns it as a shared handle.
    ///
    /// # Example
    /// ```
    /// use taskline::{SubscribeFn, SubscribeRef, TaskResult};
    ///
    /// let s: SubscribeRef<u64> = SubscribeFn::arc(|result: TaskResult<u64>| async move {
    ///     if let Ok(value) = result {
    ///         println!("got {value}");
    ///     }
    /// });
    /// ```
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut, R> Subscribe<R> for SubscribeFn<F>
where
    F: Fn(TaskResult<R>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
    R: Send + 'static,
{
    async fn on_result(&self, result: TaskResult<R>) {
        (self.f)(result).await
    }
}
