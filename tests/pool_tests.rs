//! Integration tests for the worker pool core: every accepted job runs
//! exactly once, completions are delivered, and a panicking job never takes
//! a worker down.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dispatchd::config::PoolConfig;
use dispatchd::dispatch::{Job, JobError};
use dispatchd::pool::WorkerPool;

#[tokio::test]
async fn every_accepted_job_executes_exactly_once() {
    let pool = WorkerPool::start(PoolConfig::new(4, 64));
    let counter = Arc::new(AtomicUsize::new(0));

    let mut receipts = Vec::new();
    for i in 0..20u32 {
        let counter = Arc::clone(&counter);
        let (job, rx) = Job::new(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Some(format!("job-{}", i)))
        })
        .with_completion();
        pool.submit(job).await.expect("queue has room for all jobs");
        receipts.push((i, rx));
    }

    for (i, rx) in receipts {
        let result = rx.await.expect("completion must be delivered");
        assert_eq!(result, Ok(Some(format!("job-{}", i))));
    }
    assert_eq!(counter.load(Ordering::SeqCst), 20, "each job ran exactly once");

    let report = pool.shutdown().await;
    assert!(report.is_drained());
    assert_eq!(report.workers_stopped, report.workers_total);
}

#[tokio::test]
async fn fire_and_forget_jobs_still_run() {
    let pool = WorkerPool::start(PoolConfig::new(2, 16));
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..5 {
        let counter = Arc::clone(&counter);
        let job = Job::new(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        });
        pool.submit(job).await.unwrap();
    }

    // Graceful shutdown drains the queue, so all five must have run by the
    // time it returns.
    let report = pool.shutdown().await;
    assert!(report.is_drained());
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn panicking_job_reports_error_and_worker_survives() {
    // A single worker: if the panic killed it, the follow-up job could
    // never run.
    let pool = WorkerPool::start(PoolConfig::new(1, 8));

    let (bad, bad_rx) = Job::new(async { panic!("intentional test panic") }).with_completion();
    pool.submit(bad).await.unwrap();

    match bad_rx.await.expect("error must be delivered, not dropped") {
        Err(JobError::Panicked(msg)) => assert!(msg.contains("intentional test panic")),
        other => panic!("expected Panicked, got {:?}", other),
    }

    let (good, good_rx) = Job::new(async { Ok(Some("still alive".to_string())) }).with_completion();
    pool.submit(good).await.unwrap();
    assert_eq!(good_rx.await.unwrap(), Ok(Some("still alive".to_string())));

    let report = pool.shutdown().await;
    assert!(report.is_drained());
}

#[tokio::test]
async fn stats_reflect_pool_shape() {
    let pool = WorkerPool::start(PoolConfig::new(3, 10));

    // Give the workers a moment to self-register as idle.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let stats = pool.stats();
    assert_eq!(stats.max_workers, 3);
    assert_eq!(stats.queue_capacity, 10);
    assert_eq!(stats.queued_jobs, 0);
    assert_eq!(stats.idle_workers, 3);

    let report = pool.shutdown().await;
    assert!(report.is_drained());
}

#[tokio::test]
async fn independent_pools_do_not_share_state() {
    let pool_a = WorkerPool::start(PoolConfig::new(1, 4));
    let pool_b = WorkerPool::start(PoolConfig::new(1, 4));

    let (job_a, rx_a) = Job::new(async { Ok(Some("a".to_string())) }).with_completion();
    let (job_b, rx_b) = Job::new(async { Ok(Some("b".to_string())) }).with_completion();
    pool_a.submit(job_a).await.unwrap();
    pool_b.submit(job_b).await.unwrap();

    assert_eq!(rx_a.await.unwrap(), Ok(Some("a".to_string())));
    assert_eq!(rx_b.await.unwrap(), Ok(Some("b".to_string())));

    // Shutting one pool down leaves the other fully operational.
    assert!(pool_a.shutdown().await.is_drained());
    let (job, rx) = Job::new(async { Ok(None) }).with_completion();
    pool_b.submit(job).await.unwrap();
    assert_eq!(rx.await.unwrap(), Ok(None));
    assert!(pool_b.shutdown().await.is_drained());
}
