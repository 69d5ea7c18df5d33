//! Long-lived workers that process one job at a time.
//!
//! Each worker owns a private delivery channel. When idle it publishes a
//! handle to that channel in the [`WorkerRegistry`](crate::dispatch::WorkerRegistry)
//! and waits; the dispatcher claims the handle and sends exactly one job
//! through it. After finishing the job the worker re-registers, closing the
//! Idle → Busy → Idle loop. A stop signal is only observed at the idle
//! suspension point, so a running job is never abandoned.

pub mod executor;

pub use executor::JobExecutor;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::dispatch::registry::{WorkerHandle, WorkerRegistry};

/// Lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Busy,
    Stopped,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerState::Idle => write!(f, "idle"),
            WorkerState::Busy => write!(f, "busy"),
            WorkerState::Stopped => write!(f, "stopped"),
        }
    }
}

/// A single worker in the pool.
pub struct Worker {
    id: u64,
    registry: Arc<WorkerRegistry>,
    stop: CancellationToken,
}

impl Worker {
    pub fn new(id: u64, registry: Arc<WorkerRegistry>, stop: CancellationToken) -> Self {
        Self { id, registry, stop }
    }

    /// Start the worker loop as an independent task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        // Capacity 1: a job can only arrive after a claim consumed this
        // worker's registration, so at most one job is ever buffered.
        let (tx, mut rx) = mpsc::channel(1);
        let handle = WorkerHandle::new(self.id, tx);
        let executor = JobExecutor::new(self.id);

        tracing::debug!(worker_id = self.id, "Worker started");

        loop {
            if self.stop.is_cancelled() {
                break;
            }
            if self.registry.register(handle.clone()).await.is_err() {
                break;
            }

            tracing::trace!(worker_id = self.id, state = %WorkerState::Idle, "Waiting for work");

            // Biased: a job already delivered to this worker wins over the
            // stop signal, so drained jobs are never dropped.
            tokio::select! {
                biased;
                maybe = rx.recv() => match maybe {
                    Some(job) => {
                        tracing::trace!(worker_id = self.id, state = %WorkerState::Busy, job_id = %job.id, "Job received");
                        executor.execute(job).await;
                    }
                    None => break,
                },
                _ = self.stop.cancelled() => break,
            }
        }

        tracing::debug!(worker_id = self.id, state = %WorkerState::Stopped, "Worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::job::Job;
    use std::time::Duration;

    #[test]
    fn worker_state_display() {
        assert_eq!(WorkerState::Idle.to_string(), "idle");
        assert_eq!(WorkerState::Busy.to_string(), "busy");
        assert_eq!(WorkerState::Stopped.to_string(), "stopped");
    }

    #[tokio::test]
    async fn worker_registers_when_idle_and_exits_on_stop() {
        let registry = Arc::new(WorkerRegistry::new(1));
        let stop = CancellationToken::new();
        let join = Worker::new(1, Arc::clone(&registry), stop.clone()).spawn();

        // The worker publishes its handle once it goes idle.
        let handle = registry.claim().await.expect("worker should register");
        assert_eq!(handle.worker_id(), 1);

        stop.cancel();
        join.await.unwrap();
    }

    #[tokio::test]
    async fn worker_executes_job_then_reregisters() {
        let registry = Arc::new(WorkerRegistry::new(1));
        let stop = CancellationToken::new();
        let join = Worker::new(1, Arc::clone(&registry), stop.clone()).spawn();

        let handle = registry.claim().await.unwrap();
        let (job, rx) = Job::new(async { Ok(Some("ok".to_string())) }).with_completion();
        handle.deliver(job).await.expect("worker should accept job");
        assert_eq!(rx.await.unwrap(), Ok(Some("ok".to_string())));

        // Finished the job, so the worker must be idle and registered again.
        let again = tokio::time::timeout(Duration::from_secs(1), registry.claim())
            .await
            .expect("worker should re-register after a job")
            .unwrap();
        assert_eq!(again.worker_id(), 1);

        stop.cancel();
        join.await.unwrap();
    }
}
