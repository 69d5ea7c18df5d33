use std::time::Duration;

/// Default worker count, matching a small general-purpose pool.
const DEFAULT_MAX_WORKERS: usize = 4;
/// Default bounded queue capacity.
const DEFAULT_MAX_QUEUE: usize = 256;
/// Default maximum wait for a graceful drain before workers are aborted.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Policy applied when a job is submitted while the queue is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPolicy {
    /// Suspend the submitter until a queue slot frees up.
    #[default]
    Block,
    /// Fail immediately with `QueueFull`.
    Reject,
}

impl std::fmt::Display for SubmitPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitPolicy::Block => write!(f, "block"),
            SubmitPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Configuration for a worker pool.
///
/// The worker set and queue capacity are fixed for the lifetime of the pool;
/// there is no dynamic scaling or resizing.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Fixed number of workers in the pool.
    pub max_workers: usize,
    /// Capacity of the bounded job queue.
    pub max_queue: usize,
    /// What to do when the queue is full at submission time.
    pub submit_policy: SubmitPolicy,
    /// Maximum wait for the graceful drain during shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            max_queue: DEFAULT_MAX_QUEUE,
            submit_policy: SubmitPolicy::default(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl PoolConfig {
    pub fn new(max_workers: usize, max_queue: usize) -> Self {
        Self {
            // Capacities of zero would deadlock every submission; clamp to 1.
            max_workers: max_workers.max(1),
            max_queue: max_queue.max(1),
            ..Default::default()
        }
    }

    pub fn with_submit_policy(mut self, policy: SubmitPolicy) -> Self {
        self.submit_policy = policy;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_default() {
        let cfg = PoolConfig::default();
        assert_eq!(cfg.max_workers, 4);
        assert_eq!(cfg.max_queue, 256);
        assert_eq!(cfg.submit_policy, SubmitPolicy::Block);
        assert_eq!(cfg.shutdown_timeout, Duration::from_secs(30));
    }

    #[test]
    fn pool_config_new() {
        let cfg = PoolConfig::new(2, 10);
        assert_eq!(cfg.max_workers, 2);
        assert_eq!(cfg.max_queue, 10);
        assert_eq!(cfg.submit_policy, SubmitPolicy::Block);
    }

    #[test]
    fn pool_config_clamps_zero_capacities() {
        let cfg = PoolConfig::new(0, 0);
        assert_eq!(cfg.max_workers, 1);
        assert_eq!(cfg.max_queue, 1);
    }

    #[test]
    fn pool_config_builders() {
        let cfg = PoolConfig::new(2, 10)
            .with_submit_policy(SubmitPolicy::Reject)
            .with_shutdown_timeout(Duration::from_secs(5));
        assert_eq!(cfg.submit_policy, SubmitPolicy::Reject);
        assert_eq!(cfg.shutdown_timeout, Duration::from_secs(5));
    }

    #[test]
    fn submit_policy_display() {
        assert_eq!(SubmitPolicy::Block.to_string(), "block");
        assert_eq!(SubmitPolicy::Reject.to_string(), "reject");
    }
}
