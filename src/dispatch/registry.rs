use tokio::sync::mpsc::error::SendError;
use tokio::sync::{mpsc, Mutex};

use crate::dispatch::job::Job;
use crate::error::{PoolError, Result};

/// Delivery channel for one idle worker.
///
/// A handle is published to the registry by its worker whenever the worker
/// goes idle, and consumed by exactly one dispatch attempt.
#[derive(Clone)]
pub struct WorkerHandle {
    worker_id: u64,
    tx: mpsc::Sender<Job>,
}

impl WorkerHandle {
    pub(crate) fn new(worker_id: u64, tx: mpsc::Sender<Job>) -> Self {
        Self { worker_id, tx }
    }

    pub fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// Hand a job to the worker behind this handle. Fails only if the worker
    /// has already exited, which the dispatcher treats as an invariant
    /// violation.
    pub(crate) async fn deliver(&self, job: Job) -> std::result::Result<(), SendError<Job>> {
        self.tx.send(job).await
    }
}

/// Bounded FIFO registry of idle worker handles.
///
/// Capacity equals the worker count, so `register` never suspends in correct
/// operation: a worker publishes at most one handle per idle cycle, and each
/// published handle is removed by a claim before that worker can publish
/// again.
pub struct WorkerRegistry {
    tx: mpsc::Sender<WorkerHandle>,
    rx: Mutex<mpsc::Receiver<WorkerHandle>>,
    capacity: usize,
}

impl WorkerRegistry {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
            capacity,
        }
    }

    /// Publish an idle worker handle.
    pub async fn register(&self, handle: WorkerHandle) -> Result<()> {
        self.tx
            .send(handle)
            .await
            .map_err(|_| PoolError::ShuttingDown)
    }

    /// Remove and return one idle handle, suspending until one is available.
    ///
    /// The receiver is guarded by a mutex, so concurrent claims serialize and
    /// no two claimants can ever observe the same handle.
    pub async fn claim(&self) -> Option<WorkerHandle> {
        self.rx.lock().await.recv().await
    }

    /// Number of handles currently registered (workers idle and waiting).
    pub fn idle(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
