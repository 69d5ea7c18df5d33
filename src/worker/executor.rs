use std::any::Any;

use crate::dispatch::job::{Job, JobError, JobResult, WorkFuture};

/// Executes jobs on behalf of one worker.
///
/// The work future runs on its own task so that a panicking job is caught at
/// the worker boundary and converted into a delivered `JobError::Panicked`
/// instead of taking the worker down.
#[derive(Debug, Clone)]
pub struct JobExecutor {
    worker_id: u64,
}

impl JobExecutor {
    pub fn new(worker_id: u64) -> Self {
        Self { worker_id }
    }

    /// Execute one job and deliver its result on the completion channel,
    /// if the submitter attached one.
    pub async fn execute(&self, job: Job) {
        let Job {
            id,
            work,
            completion,
            ..
        } = job;

        tracing::debug!(job_id = %id, worker_id = self.worker_id, "Executing job");
        let result = Self::run_isolated(work).await;

        match &result {
            Ok(_) => {
                tracing::debug!(job_id = %id, worker_id = self.worker_id, "Job completed")
            }
            Err(err) => tracing::warn!(
                job_id = %id,
                worker_id = self.worker_id,
                error = %err,
                "Job failed"
            ),
        }

        if let Some(tx) = completion {
            // The submitter may have dropped its receiver; fire-and-forget.
            let _ = tx.send(result);
        }
    }

    async fn run_isolated(work: WorkFuture) -> JobResult {
        match tokio::spawn(work).await {
            Ok(result) => result,
            Err(err) if err.is_panic() => {
                Err(JobError::Panicked(panic_message(err.into_panic())))
            }
            Err(_) => Err(JobError::Failed("job task was cancelled".to_string())),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
