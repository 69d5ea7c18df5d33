use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::dispatch::job::Job;
use crate::dispatch::registry::WorkerRegistry;

/// Pairs queued jobs with idle workers.
///
/// Jobs are removed from the queue in FIFO order, but each claim-and-deliver
/// pairing runs as its own task so that a slow claim never blocks queue
/// draining. Start-of-execution order across workers is therefore not
/// guaranteed; what is guaranteed is that no accepted job is dropped or
/// delivered twice.
///
/// In-flight pairings are capped at the worker count. Without the cap every
/// queued job would immediately move into a claim task and the queue could
/// never fill, making the configured capacity meaningless.
pub struct Dispatcher {
    registry: Arc<WorkerRegistry>,
    rx: mpsc::Receiver<Job>,
    drain: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<WorkerRegistry>,
        rx: mpsc::Receiver<Job>,
        drain: CancellationToken,
    ) -> Self {
        Self { registry, rx, drain }
    }

    /// Start the dispatch loop as an independent task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Main loop: pull jobs until the drain signal, then close the queue to
    /// further submissions, deliver everything already buffered, and wait for
    /// all in-flight pairings before returning.
    async fn run(mut self) {
        let mut in_flight = JoinSet::new();

        loop {
            // Only pull the next job once a pairing slot is free; a job held
            // between recv and spawn would vacate its queue slot early and
            // quietly stretch the configured capacity.
            self.wait_for_slot(&mut in_flight).await;

            tokio::select! {
                _ = self.drain.cancelled() => {
                    // Wakes any submitter suspended on a full queue with a
                    // closed-channel error; buffered jobs remain readable.
                    self.rx.close();
                    break;
                }
                maybe = self.rx.recv() => match maybe {
                    Some(job) => self.pair(&mut in_flight, job),
                    None => break,
                },
            }
        }

        while let Some(job) = self.rx.recv().await {
            self.wait_for_slot(&mut in_flight).await;
            self.pair(&mut in_flight, job);
        }
        while in_flight.join_next().await.is_some() {}

        tracing::debug!("Dispatcher stopped");
    }

    /// Reap finished pairings, then wait until fewer than one pairing per
    /// worker is in flight.
    async fn wait_for_slot(&self, in_flight: &mut JoinSet<()>) {
        while in_flight.try_join_next().is_some() {}
        while in_flight.len() >= self.registry.capacity() {
            if in_flight.join_next().await.is_none() {
                break;
            }
        }
    }

    /// Fan out one claim-and-deliver pairing.
    fn pair(&self, in_flight: &mut JoinSet<()>, job: Job) {
        tracing::debug!(job_id = %job.id, "Job pulled from queue");

        let registry = Arc::clone(&self.registry);
        in_flight.spawn(async move {
            let Some(handle) = registry.claim().await else {
                // Registry can only close if every worker is gone while jobs
                // are still queued. Surface it; do not crash the pool.
                tracing::error!(job_id = %job.id, "Invariant violation: worker registry closed while claiming");
                return;
            };

            tracing::debug!(
                job_id = %job.id,
                worker_id = handle.worker_id(),
                "Delivering job to idle worker"
            );
            if let Err(err) = handle.deliver(job).await {
                let job = err.0;
                tracing::error!(
                    job_id = %job.id,
                    worker_id = handle.worker_id(),
                    "Invariant violation: worker channel closed before delivery"
                );
            }
        });
    }
}
