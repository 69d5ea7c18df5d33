use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Error raised by a job's own work, delivered on its completion channel.
///
/// Execution errors never cross the worker boundary as panics or returned
/// errors; they travel back to the submitter through the per-job channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("Job failed: {0}")]
    Failed(String),

    #[error("Job panicked: {0}")]
    Panicked(String),
}

/// Outcome of a single job execution: optional output on success.
pub type JobResult = std::result::Result<Option<String>, JobError>;

/// Boxed unit of work executed by a worker.
pub type WorkFuture = Pin<Box<dyn Future<Output = JobResult> + Send + 'static>>;

/// An opaque unit of work submitted to the pool.
///
/// A job is owned by the queue until a worker claims it, by the worker while
/// it runs, and is dropped once its result has been delivered (or silently,
/// when submitted fire-and-forget without a completion channel).
pub struct Job {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub(crate) work: WorkFuture,
    pub(crate) completion: Option<oneshot::Sender<JobResult>>,
}

impl Job {
    /// Create a fire-and-forget job from a work future.
    pub fn new<F>(work: F) -> Self
    where
        F: Future<Output = JobResult> + Send + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            work: Box::pin(work),
            completion: None,
        }
    }

    /// Attach a completion channel. The receiver gets exactly one
    /// result-or-error once the job has run; it is closed without a value
    /// only if the job is discarded during a forced shutdown.
    pub fn with_completion(mut self) -> (Self, oneshot::Receiver<JobResult>) {
        let (tx, rx) = oneshot::channel();
        self.completion = Some(tx);
        (self, rx)
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("submitted_at", &self.submitted_at)
            .field("has_completion", &self.completion.is_some())
            .finish()
    }
}
