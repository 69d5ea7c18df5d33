use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::SubmitPolicy;
use crate::dispatch::job::Job;
use crate::error::{PoolError, Result};

/// Submission side of the bounded job queue.
///
/// Cloneable; every front-end adapter gets its own handle. The single
/// receiving side is owned by the dispatcher. FIFO order is preserved for
/// jobs that have been accepted, relative to each other.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<Job>,
    policy: SubmitPolicy,
    shutdown: CancellationToken,
}

impl JobQueue {
    /// Create a bounded queue. The returned receiver is handed to the
    /// dispatcher; the `shutdown` token makes submissions fail fast once
    /// the pool starts draining.
    pub fn bounded(
        capacity: usize,
        policy: SubmitPolicy,
        shutdown: CancellationToken,
    ) -> (Self, mpsc::Receiver<Job>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx,
                policy,
                shutdown,
            },
            rx,
        )
    }

    /// Submit a job, applying the configured capacity policy.
    ///
    /// Under `Reject` this never suspends: a full queue yields `QueueFull`
    /// immediately. Under `Block` the caller is suspended until a slot
    /// frees up. Returns the job id on acceptance.
    pub async fn submit(&self, job: Job) -> Result<Uuid> {
        if self.shutdown.is_cancelled() {
            return Err(PoolError::ShuttingDown);
        }
        let job_id = job.id;

        match self.policy {
            SubmitPolicy::Reject => match self.tx.try_send(job) {
                Ok(()) => Ok(job_id),
                Err(TrySendError::Full(_)) => Err(PoolError::QueueFull),
                Err(TrySendError::Closed(_)) => Err(PoolError::ShuttingDown),
            },
            SubmitPolicy::Block => {
                // The dispatcher closes the receiver when draining starts,
                // which wakes any submitter suspended here.
                self.tx
                    .send(job)
                    .await
                    .map(|_| job_id)
                    .map_err(|_| PoolError::ShuttingDown)
            }
        }
    }

    /// Submit with a deadline: suspends like the blocking policy, but gives
    /// up with `Timeout` once `timeout` elapses without a free slot.
    pub async fn submit_with_timeout(&self, job: Job, timeout: Duration) -> Result<Uuid> {
        if self.shutdown.is_cancelled() {
            return Err(PoolError::ShuttingDown);
        }
        let job_id = job.id;

        match self.tx.send_timeout(job, timeout).await {
            Ok(()) => Ok(job_id),
            Err(SendTimeoutError::Timeout(_)) => Err(PoolError::Timeout),
            Err(SendTimeoutError::Closed(_)) => Err(PoolError::ShuttingDown),
        }
    }

    /// Number of jobs currently buffered in the queue.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured queue capacity.
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}
