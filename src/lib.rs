//! # taskline
//!
//! **Taskline** is an in-process, order-preserving concurrent task runner.
//!
//! Tasks are submitted in a sequence, executed by a fixed pool of parallel
//! workers (completing in arbitrary order), and delivered to a single
//! subscriber in exactly the submission order. Outstanding work is bounded:
//! once `max_pending` tasks are admitted but undelivered, admission waits
//! until a delivery completes, so a slow consumer or slow workers throttle
//! the producer instead of queuing without bound.
//!
//! It trades some of the speed-up of unordered parallel execution for the
//! determinism of sequential semantics — useful when downstream logic
//! (ordered log enrichment, pipelined batch transforms) needs FIFO output but
//! the per-item transform is parallelizable.
//!
//! ## Architecture
//! ```text
//!    add_task(task)                                      caller
//!         │ waits while max_pending tasks are outstanding
//!         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Slot ring (capacity C, allocated once, indices recycled)       │
//! │  slot: Idle → Ready → Running → Done → Idle                     │
//! └──────┬──────────────────────────────────────────────────▲───────┘
//!        │ dispatch queue (slot indices)                    │ reset
//!        ▼                                                  │
//!   ┌─────────┐  ┌─────────┐       ┌─────────┐        ┌───────────┐
//!   │ worker 0│  │ worker 1│  ...  │ worker N│ ─done─► │ sequencer │
//!   └─────────┘  └─────────┘       └─────────┘        └─────┬─────┘
//!      handler(worker_id, task), any completion order       │ cursor order
//!                                                           ▼
//!                                                    output queue (cap C)
//!                                                           │
//!                                                           ▼
//!                                                       consumer
//!                                               subscriber.on_result(..)
//!                                                           │
//!              admission capacity released ◄────────────────┘
//! ```
//!
//! The sequencer is the defining piece: it never advances past an incomplete
//! slot, so a later task that finishes first waits in its ring position until
//! every earlier task has been published — parallel execution, serial
//! publication.
//!
//! ## Guarantees
//! - **FIFO delivery**: the subscriber observes results in exactly
//!   [`add_task`](Runner::add_task) order, for any worker count and any
//!   per-task latency.
//! - **Serialized delivery**: the subscriber is never invoked concurrently
//!   with itself.
//! - **Bounded work**: at most `max_pending` tasks are admitted but
//!   undelivered; exactly one admission becomes possible per delivery.
//! - **Fault isolation**: a panicking handler is delivered as
//!   [`TaskError::Panic`] at its position; the pipeline keeps going.
//! - **Abrupt close**: [`close`](Runner::close) releases every waiter and
//!   abandons undelivered work. It is idempotent.
//!
//! ## Example
//! ```rust
//! use taskline::{Runner, RunnerConfig, SubscribeFn, TaskResult};
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Runner::builder(RunnerConfig {
//!         worker_count: 4,
//!         max_pending: 64,
//!     })
//!     .with_handler_fn(|_worker_id, task: u64| async move { task + 1 })
//!     .build()?;
//!
//!     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!     runner
//!         .subscribe(SubscribeFn::arc(move |result: TaskResult<u64>| {
//!             let tx = tx.clone();
//!             async move {
//!                 let _ = tx.send(result);
//!             }
//!         }))
//!         .await?;
//!
//!     for task in 0..10u64 {
//!         runner.add_task(task).await?;
//!     }
//!
//!     // Workers may finish out of order; delivery is strictly 1, 2, .., 10.
//!     for expected in 1..=10u64 {
//!         assert_eq!(rx.recv().await.unwrap(), Ok(expected));
//!     }
//!
//!     runner.close();
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod handler;
mod runner;
mod subscribe;

// ---- Public re-exports ----

pub use config::RunnerConfig;
pub use error::{RunnerError, TaskError, TaskResult};
pub use handler::{Handler, HandlerFn, HandlerRef};
pub use runner::{Runner, RunnerBuilder};
pub use subscribe::{Subscribe, SubscribeFn, SubscribeRef};
