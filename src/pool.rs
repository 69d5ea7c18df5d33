use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::PoolConfig;
use crate::dispatch::{Dispatcher, Job, JobQueue, WorkerRegistry};
use crate::error::Result;
use crate::worker::Worker;

/// Point-in-time view of pool occupancy.
///
/// Counts are taken from the queue and registry channels and may lag behind
/// in-flight claims by a moment; they are meant for observability, not for
/// admission decisions.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    pub queued_jobs: usize,
    pub queue_capacity: usize,
    pub idle_workers: usize,
    pub max_workers: usize,
}

/// Cloneable handle for taking [`PoolStats`] snapshots, usable by adapters
/// that outlive the pool value itself (the gateway keeps one while the pool
/// is being shut down).
#[derive(Clone)]
pub struct StatsHandle {
    queue: JobQueue,
    registry: Arc<WorkerRegistry>,
    max_workers: usize,
}

impl StatsHandle {
    pub fn snapshot(&self) -> PoolStats {
        PoolStats {
            queued_jobs: self.queue.len(),
            queue_capacity: self.queue.capacity(),
            idle_workers: self.registry.idle(),
            max_workers: self.max_workers,
        }
    }
}

/// How a shutdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShutdownOutcome {
    /// All queued jobs were dispatched and every worker stopped in time.
    Drained,
    /// The shutdown timeout elapsed first; remaining workers were aborted
    /// and still-queued jobs were discarded with their completion channels
    /// closed.
    TimedOut,
}

/// Result of a graceful shutdown attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ShutdownReport {
    pub outcome: ShutdownOutcome,
    pub workers_stopped: usize,
    pub workers_total: usize,
}

impl ShutdownReport {
    pub fn is_drained(&self) -> bool {
        self.outcome == ShutdownOutcome::Drained
    }
}

/// A bounded worker pool.
///
/// Owns the job queue, the idle-worker registry, the dispatcher task and the
/// fixed worker set. Pools are explicitly constructed values: several
/// independent pools can coexist in one process.
pub struct WorkerPool {
    config: PoolConfig,
    queue: JobQueue,
    registry: Arc<WorkerRegistry>,
    dispatcher: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
    drain: CancellationToken,
    stop_workers: CancellationToken,
}

impl WorkerPool {
    /// Start a pool: creates the bounded queue and registry, then spawns the
    /// fixed worker set and the dispatcher loop.
    pub fn start(config: PoolConfig) -> Self {
        let drain = CancellationToken::new();
        let stop_workers = CancellationToken::new();

        let (queue, job_rx) =
            JobQueue::bounded(config.max_queue, config.submit_policy, drain.clone());
        let registry = Arc::new(WorkerRegistry::new(config.max_workers));

        let workers = (0..config.max_workers as u64)
            .map(|id| Worker::new(id, Arc::clone(&registry), stop_workers.clone()).spawn())
            .collect();
        let dispatcher = Dispatcher::new(Arc::clone(&registry), job_rx, drain.clone()).spawn();

        tracing::info!(
            max_workers = config.max_workers,
            max_queue = config.max_queue,
            submit_policy = %config.submit_policy,
            "Worker pool started"
        );

        Self {
            config,
            queue,
            registry,
            dispatcher,
            workers,
            drain,
            stop_workers,
        }
    }

    /// Cloneable submission handle for front-end adapters.
    pub fn handle(&self) -> JobQueue {
        self.queue.clone()
    }

    /// Submit a job through the pool's own handle.
    pub async fn submit(&self, job: Job) -> Result<Uuid> {
        self.queue.submit(job).await
    }

    /// Submit with a deadline for acquiring a queue slot.
    pub async fn submit_with_timeout(&self, job: Job, timeout: Duration) -> Result<Uuid> {
        self.queue.submit_with_timeout(job, timeout).await
    }

    pub fn stats(&self) -> PoolStats {
        self.stats_handle().snapshot()
    }

    pub fn stats_handle(&self) -> StatsHandle {
        StatsHandle {
            queue: self.queue.clone(),
            registry: Arc::clone(&self.registry),
            max_workers: self.config.max_workers,
        }
    }

    /// Graceful drain-then-stop.
    ///
    /// Stops accepting submissions, lets the dispatcher hand every queued job
    /// to a worker, waits for in-flight jobs to finish, then stops the
    /// workers. Bounded by `shutdown_timeout`: on expiry the remaining tasks
    /// are aborted and the report marks the shutdown as timed out.
    pub async fn shutdown(self) -> ShutdownReport {
        tracing::info!("Worker pool shutting down");
        self.drain.cancel();

        let WorkerPool {
            config,
            mut dispatcher,
            mut workers,
            stop_workers,
            ..
        } = self;
        let workers_total = workers.len();

        let graceful = async {
            // Dispatcher exits once the queue is fully drained and every
            // claim-and-deliver pairing has finished. Only then is it safe
            // to stop workers without losing a delivered job.
            let _ = (&mut dispatcher).await;
            stop_workers.cancel();
            for worker in workers.iter_mut() {
                let _ = worker.await;
            }
        };

        let drained = tokio::time::timeout(config.shutdown_timeout, graceful).await;

        match drained {
            Ok(()) => {
                tracing::info!(workers = workers_total, "Worker pool drained");
                ShutdownReport {
                    outcome: ShutdownOutcome::Drained,
                    workers_stopped: workers_total,
                    workers_total,
                }
            }
            Err(_) => {
                let workers_stopped = workers
                    .iter()
                    .filter(|worker| worker.is_finished())
                    .count();
                dispatcher.abort();
                for worker in &workers {
                    worker.abort();
                }
                tracing::warn!(
                    workers_stopped,
                    workers_total,
                    "Shutdown timeout elapsed, aborting remaining workers"
                );
                ShutdownReport {
                    outcome: ShutdownOutcome::TimedOut,
                    workers_stopped,
                    workers_total,
                }
            }
        }
    }
}
