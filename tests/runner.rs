use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::time::{sleep, timeout};

use taskline::{
    Runner, RunnerConfig, RunnerError, SubscribeFn, SubscribeRef, TaskError, TaskResult,
};

/// Subscriber that forwards every delivery into an unbounded channel, so tests
/// can assert on the exact delivery sequence.
fn collector<R: Send + 'static>() -> (SubscribeRef<R>, mpsc::UnboundedReceiver<TaskResult<R>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sub = SubscribeFn::arc(move |result: TaskResult<R>| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(result);
        }
    });
    (sub, rx)
}

async fn recv<R: Send + 'static>(rx: &mut mpsc::UnboundedReceiver<TaskResult<R>>) -> TaskResult<R> {
    timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("timed out waiting for a delivery")
        .expect("delivery channel closed")
}

#[tokio::test]
async fn test_capacity_one_preserves_order() {
    let runner = Runner::builder(RunnerConfig {
        worker_count: 1,
        max_pending: 1,
    })
    .with_handler_fn(|_worker_id, task: u32| async move { task })
    .build()
    .unwrap();

    let (sub, mut rx) = collector();
    runner.subscribe(sub).await.unwrap();

    for task in 0..3u32 {
        runner.add_task(task).await.unwrap();
    }
    for expected in 0..3u32 {
        assert_eq!(recv(&mut rx).await, Ok(expected));
    }
    runner.close();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_random_latency_preserves_order() {
    let runner = Runner::builder(RunnerConfig {
        worker_count: 4,
        max_pending: 1024,
    })
    .with_handler_fn(|_worker_id, task: u64| async move {
        sleep(Duration::from_millis(fastrand::u64(0..100))).await;
        task + 1
    })
    .build()
    .unwrap();

    let (sub, mut rx) = collector();
    runner.subscribe(sub).await.unwrap();

    for task in 0..200u64 {
        runner.add_task(task).await.unwrap();
    }

    // Strictly increasing, no gaps, no repeats, despite unordered completion.
    for expected in 1..=200u64 {
        assert_eq!(recv(&mut rx).await, Ok(expected));
    }
    runner.close();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pending_count_tracks_admissions_and_drain() {
    let runner = Runner::builder(RunnerConfig {
        worker_count: 4,
        max_pending: 100,
    })
    .with_handler_fn(|_worker_id, task: u32| async move { task })
    .build()
    .unwrap();

    // Admission works before the pipeline is started by subscribe.
    for task in 0..100u32 {
        runner.add_task(task).await.unwrap();
    }
    assert_eq!(runner.pending_count(), 100);

    let (sub, mut rx) = collector();
    runner.subscribe(sub).await.unwrap();
    for expected in 0..100u32 {
        assert_eq!(recv(&mut rx).await, Ok(expected));
    }

    // The last decrement lands just after the last delivery.
    for _ in 0..100 {
        if runner.pending_count() == 0 {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(runner.pending_count(), 0);
    runner.close();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_backpressure_blocks_at_capacity() {
    let gate = Arc::new(Semaphore::new(0));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let sub_gate = Arc::clone(&gate);
    let sub: SubscribeRef<u32> = SubscribeFn::arc(move |result: TaskResult<u32>| {
        let gate = Arc::clone(&sub_gate);
        let tx = tx.clone();
        async move {
            gate.acquire().await.unwrap().forget();
            let _ = tx.send(result);
        }
    });

    let runner = Runner::builder(RunnerConfig {
        worker_count: 1,
        max_pending: 2,
    })
    .with_handler_fn(|_worker_id, task: u32| async move { task })
    .build()
    .unwrap();
    runner.subscribe(sub).await.unwrap();

    runner.add_task(0).await.unwrap();
    runner.add_task(1).await.unwrap();

    // Capacity is 2 and nothing has been delivered: the third admission waits.
    let blocked = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move { runner.add_task(2).await })
    };
    sleep(Duration::from_millis(50)).await;
    assert!(!blocked.is_finished());

    // One delivery makes exactly one admission possible.
    gate.add_permits(1);
    blocked.await.unwrap().unwrap();

    gate.add_permits(2);
    for expected in 0..3u32 {
        assert_eq!(recv(&mut rx).await, Ok(expected));
    }
    runner.close();
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let runner = Runner::builder(RunnerConfig {
        worker_count: 2,
        max_pending: 4,
    })
    .with_handler_fn(|_worker_id, task: u32| async move { task })
    .build()
    .unwrap();

    runner.close();
    runner.close();

    assert!(matches!(
        runner.add_task(0).await,
        Err(RunnerError::Closed)
    ));
    let (sub, _rx) = collector::<u32>();
    assert!(matches!(
        runner.subscribe(sub).await,
        Err(RunnerError::Closed)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_close_unblocks_admission() {
    let runner = Runner::builder(RunnerConfig {
        worker_count: 1,
        max_pending: 1,
    })
    .with_handler_fn(|_worker_id, task: u32| async move { task })
    .build()
    .unwrap();

    // No subscriber: the single slot fills and stays occupied.
    runner.add_task(0).await.unwrap();

    let blocked = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move { runner.add_task(1).await })
    };
    sleep(Duration::from_millis(50)).await;
    assert!(!blocked.is_finished());

    runner.close();
    assert!(matches!(blocked.await.unwrap(), Err(RunnerError::Closed)));
}

#[tokio::test]
async fn test_handler_panic_is_delivered_in_sequence() {
    let runner = Runner::builder(RunnerConfig {
        worker_count: 1,
        max_pending: 8,
    })
    .with_handler_fn(|_worker_id, task: u32| async move {
        if task == 1 {
            panic!("boom");
        }
        task
    })
    .build()
    .unwrap();

    let (sub, mut rx) = collector();
    runner.subscribe(sub).await.unwrap();

    for task in 0..3u32 {
        runner.add_task(task).await.unwrap();
    }

    assert_eq!(recv(&mut rx).await, Ok(0));
    match recv(&mut rx).await {
        Err(TaskError::Panic { message }) => assert_eq!(message, "boom"),
        other => panic!("expected a captured panic, got {other:?}"),
    }
    // The faulting task neither killed the worker nor stalled the sequencer.
    assert_eq!(recv(&mut rx).await, Ok(2));
    runner.close();
}

#[tokio::test]
async fn test_resubscribe_replaces_subscriber() {
    let runner = Runner::builder(RunnerConfig {
        worker_count: 1,
        max_pending: 4,
    })
    .with_handler_fn(|_worker_id, task: u32| async move { task })
    .build()
    .unwrap();

    let (sub_a, mut rx_a) = collector();
    runner.subscribe(sub_a).await.unwrap();
    runner.add_task(0).await.unwrap();
    assert_eq!(recv(&mut rx_a).await, Ok(0));

    let (sub_b, mut rx_b) = collector();
    runner.subscribe(sub_b).await.unwrap();
    runner.add_task(1).await.unwrap();
    assert_eq!(recv(&mut rx_b).await, Ok(1));
    assert!(rx_a.try_recv().is_err());
    runner.close();
}

#[test]
fn test_builder_requires_handler() {
    let Err(err) = Runner::<u32, u32>::builder(RunnerConfig::default()).build() else {
        panic!("expected build to fail without a handler");
    };
    assert!(matches!(err, RunnerError::InvalidHandler));
}

#[test]
fn test_builder_rejects_zero_bounds() {
    let Err(err) = Runner::builder(RunnerConfig {
        worker_count: 0,
        max_pending: 4,
    })
    .with_handler_fn(|_worker_id, task: u32| async move { task })
    .build() else {
        panic!("expected build to fail with zero workers");
    };
    assert!(matches!(err, RunnerError::InvalidConfig { .. }));

    let Err(err) = Runner::builder(RunnerConfig {
        worker_count: 1,
        max_pending: 0,
    })
    .with_handler_fn(|_worker_id, task: u32| async move { task })
    .build() else {
        panic!("expected build to fail with zero capacity");
    };
    assert!(matches!(err, RunnerError::InvalidConfig { .. }));
}
