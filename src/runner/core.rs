//! # Runner: admission, worker pool, sequencer, and delivery.
//!
//! The [`Runner`] composes the pipeline roles over one shared slot ring:
//!
//! ```text
//! add_task ──► admission (semaphore, C permits) ──► SlotRing[Ready]
//!                                                       │ index
//!                                                       ▼
//!                                            dispatch queue (cap C)
//!                                             │         │        │
//!                                         worker 0  worker 1  worker N-1
//!                                             │  handler(worker_id, task)
//!                                             ▼
//!                                         SlotRing[Done] ──notify──► sequencer
//!                                                                       │ cursor order
//!                                                                       ▼
//!                                                             output queue (cap C)
//!                                                                       │
//!                                                                       ▼
//!                                                                   consumer
//!                                                         subscriber.on_result(..)
//!                                                                       │
//!                                          admission permit ◄── release per delivery
//! ```
//!
//! ## Rules
//! - Workers complete in arbitrary order; the sequencer publishes strictly in
//!   admission order and never advances past an incomplete slot.
//! - Every slot transition happens under the single ring mutex, so a slot's
//!   state and payload are always observed together.
//! - An admission permit is released only after the subscriber has seen the
//!   corresponding result, which is what makes a slot index safe to reuse and
//!   what bounds outstanding work at `max_pending`.
//! - Close is abrupt: waiters are released, undelivered work is abandoned,
//!   results already queued for delivery still drain.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, Mutex, Notify, RwLock, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::config::RunnerConfig;
use crate::error::{RunnerError, TaskError, TaskResult};
use crate::handler::HandlerRef;
use crate::subscribe::SubscribeRef;

use super::builder::RunnerBuilder;
use super::ring::SlotRing;

/// Order-preserving concurrent task runner.
///
/// Tasks admitted through [`add_task`](Runner::add_task) run on a fixed pool
/// of parallel workers and are delivered to the subscriber in exactly the
/// admission order, with at most `max_pending` tasks outstanding.
///
/// Construct via [`Runner::builder`]; the pipeline starts on the first
/// [`subscribe`](Runner::subscribe).
pub struct Runner<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    cfg: RunnerConfig,
    handler: HandlerRef<T, R>,
    shared: Arc<Shared<T, R>>,

    /// Producer side of the dispatch queue (slot indices for the worker pool).
    dispatch_tx: mpsc::Sender<usize>,
    /// Consumer side, shared by all workers: first free worker takes the next index.
    dispatch_rx: Arc<Mutex<mpsc::Receiver<usize>>>,

    /// Whether the pipeline loops have been spawned (first subscribe wins).
    started: AtomicBool,
}

/// State shared between the runner handle and the spawned pipeline loops.
struct Shared<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// The slot ring; one lock covers every state transition.
    ring: Mutex<SlotRing<T, R>>,

    /// Currently registered subscriber; replaced between deliveries.
    subscriber: RwLock<Option<SubscribeRef<R>>>,

    /// Admission capacity: `max_pending` permits, one held per outstanding
    /// task, released after delivery. Closed on shutdown so blocked admitters
    /// wake with an error.
    admission: Semaphore,

    /// Advisory count of admitted-but-undelivered tasks.
    pending: AtomicUsize,

    /// Workers signal the sequencer here after marking a slot done.
    completed: Notify,

    /// Closeable lifecycle; cancellation is monotone and broadcast.
    closed: CancellationToken,
}

impl<T, R> Runner<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Starts building a runner with the given configuration.
    pub fn builder(cfg: RunnerConfig) -> RunnerBuilder<T, R> {
        RunnerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: RunnerConfig, handler: HandlerRef<T, R>) -> Arc<Self> {
        let capacity = cfg.max_pending;
        let (dispatch_tx, dispatch_rx) = mpsc::channel(capacity);

        let shared = Arc::new(Shared {
            ring: Mutex::new(SlotRing::new(capacity)),
            subscriber: RwLock::new(None),
            admission: Semaphore::new(capacity),
            pending: AtomicUsize::new(0),
            completed: Notify::new(),
            closed: CancellationToken::new(),
        });

        Arc::new(Self {
            cfg,
            handler,
            shared,
            dispatch_tx,
            dispatch_rx: Arc::new(Mutex::new(dispatch_rx)),
            started: AtomicBool::new(false),
        })
    }

    /// Admits one task for execution.
    ///
    /// Waits cooperatively while `max_pending` tasks are outstanding and the
    /// runner is open; exactly one admission becomes possible per delivery.
    /// Returns [`RunnerError::Closed`] without enqueueing if the runner closes
    /// before the task is admitted — while the runner is open, a returned
    /// `Ok` means the task is durably queued for execution.
    pub async fn add_task(&self, task: T) -> Result<(), RunnerError> {
        let permit = self
            .shared
            .admission
            .acquire()
            .await
            .map_err(|_| RunnerError::Closed)?;

        // Close may have raced the acquire; never admit into a closed runner.
        if self.shared.closed.is_cancelled() {
            return Err(RunnerError::Closed);
        }

        // The permit is held for the task's whole lifetime and returned by the
        // consumer after delivery.
        permit.forget();

        let index = {
            let mut ring = self.shared.ring.lock().await;
            ring.admit(task)
        };
        self.shared.pending.fetch_add(1, Ordering::SeqCst);

        // The dispatch queue holds `max_pending` indices and at most that many
        // are ever outstanding, so this send does not block in practice.
        if self.dispatch_tx.send(index).await.is_err() {
            return Err(RunnerError::Closed);
        }
        Ok(())
    }

    /// Registers the subscriber and starts the pipeline.
    ///
    /// Exactly one subscriber is active at a time; calling again replaces it
    /// (the replacement takes effect between deliveries). The first successful
    /// call spawns the worker pool, the sequencer, and the consumer loop.
    ///
    /// Returns [`RunnerError::Closed`] if the runner has been closed.
    pub async fn subscribe(&self, subscriber: SubscribeRef<R>) -> Result<(), RunnerError> {
        if self.shared.closed.is_cancelled() {
            return Err(RunnerError::Closed);
        }

        *self.shared.subscriber.write().await = Some(subscriber);

        if !self.started.swap(true, Ordering::SeqCst) {
            self.start_pipeline();
        }
        Ok(())
    }

    /// Advisory snapshot of tasks admitted but not yet delivered.
    pub fn pending_count(&self) -> usize {
        self.shared.pending.load(Ordering::SeqCst)
    }

    /// Closes the runner. Idempotent; a second call is a no-op.
    ///
    /// Releases every blocked waiter: admitters fail with
    /// [`RunnerError::Closed`], the sequencer and workers exit. Admitted but
    /// undelivered tasks are abandoned; results already queued for delivery
    /// still drain to the subscriber.
    pub fn close(&self) {
        if self.shared.closed.is_cancelled() {
            return;
        }
        self.shared.closed.cancel();
        self.shared.admission.close();
        self.shared.completed.notify_waiters();
    }

    fn start_pipeline(&self) {
        let (output_tx, output_rx) = mpsc::channel(self.cfg.max_pending);

        for worker_id in 0..self.cfg.worker_count {
            tokio::spawn(worker_loop(
                Arc::clone(&self.shared),
                Arc::clone(&self.dispatch_rx),
                Arc::clone(&self.handler),
                worker_id,
            ));
        }
        tokio::spawn(sequencer_loop(Arc::clone(&self.shared), output_tx));
        tokio::spawn(consumer_loop(Arc::clone(&self.shared), output_rx));
    }
}

impl<T, R> Drop for Runner<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    fn drop(&mut self) {
        self.close();
    }
}

/// One worker: pull the next slot index, execute the handler, store the outcome.
///
/// Handler faults are captured and stored as [`TaskError::Panic`] so a single
/// failing task can neither kill the worker nor stall the sequencer.
async fn worker_loop<T, R>(
    shared: Arc<Shared<T, R>>,
    dispatch: Arc<Mutex<mpsc::Receiver<usize>>>,
    handler: HandlerRef<T, R>,
    worker_id: usize,
) where
    T: Send + 'static,
    R: Send + 'static,
{
    loop {
        let index = {
            let mut rx = dispatch.lock().await;
            tokio::select! {
                _ = shared.closed.cancelled() => None,
                index = rx.recv() => index,
            }
        };
        let Some(index) = index else { break };

        let task = {
            let mut ring = shared.ring.lock().await;
            ring.begin(index)
        };
        let Some(task) = task else { continue };

        // No lock is held while the handler runs.
        let outcome = std::panic::AssertUnwindSafe(handler.run(worker_id, task))
            .catch_unwind()
            .await;
        let result = match outcome {
            Ok(value) => Ok(value),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                eprintln!("[taskline] worker {worker_id} handler panicked: {message}");
                Err(TaskError::Panic { message })
            }
        };

        let finished = {
            let mut ring = shared.ring.lock().await;
            ring.finish(index, result)
        };
        if finished {
            shared.completed.notify_one();
        }
    }
}

/// The order-restoring gate: publishes the cursor slot once it is done.
///
/// The ring acts as a reorder buffer — a later task that finishes first sits
/// in `Done`, occupying its position, until every earlier slot has been
/// published.
async fn sequencer_loop<T, R>(shared: Arc<Shared<T, R>>, output: mpsc::Sender<TaskResult<R>>)
where
    T: Send + 'static,
    R: Send + 'static,
{
    let capacity = {
        let ring = shared.ring.lock().await;
        ring.capacity()
    };
    let mut cursor = 0usize;

    loop {
        // Register interest before inspecting the slot: a completion landing
        // between the check and the wait leaves a stored permit in `completed`.
        let completed = shared.completed.notified();

        let published = {
            let mut ring = shared.ring.lock().await;
            ring.publish(cursor)
        };
        match published {
            Some(result) => {
                cursor = (cursor + 1) % capacity;
                // Dropping on the floor would break the exactly-once contract;
                // a send error means the consumer is gone, so stop publishing.
                if output.send(result).await.is_err() {
                    break;
                }
            }
            None => {
                tokio::select! {
                    _ = shared.closed.cancelled() => break,
                    _ = completed => {}
                }
            }
        }
    }
}

/// Delivery: drain published results in order and invoke the subscriber.
///
/// Exits when the output queue closes (the sequencer has stopped), draining
/// already-published results first. Each delivery releases one admission
/// permit, which is what lets the producer make progress again.
async fn consumer_loop<T, R>(shared: Arc<Shared<T, R>>, mut output: mpsc::Receiver<TaskResult<R>>)
where
    T: Send + 'static,
    R: Send + 'static,
{
    while let Some(result) = output.recv().await {
        let subscriber = {
            let guard = shared.subscriber.read().await;
            guard.clone()
        };
        if let Some(subscriber) = subscriber {
            subscriber.on_result(result).await;
        }

        shared.pending.fetch_sub(1, Ordering::SeqCst);
        shared.admission.add_permits(1);
    }
}

/// Best-effort extraction of a panic payload for the stored fault.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
