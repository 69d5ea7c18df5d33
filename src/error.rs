use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Job queue is full")]
    QueueFull,

    #[error("Pool is shutting down")]
    ShuttingDown,

    #[error("Timed out waiting for queue capacity")]
    Timeout,

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, PoolError>;
