pub mod dispatcher;
pub mod job;
pub mod queue;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use job::{Job, JobError, JobResult};
pub use queue::JobQueue;
pub use registry::{WorkerHandle, WorkerRegistry};
