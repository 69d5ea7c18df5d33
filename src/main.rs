use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use dispatchd::config::{PoolConfig, SubmitPolicy};
use dispatchd::gateway::{run_gateway, GatewayState};
use dispatchd::pool::WorkerPool;
use dispatchd::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "dispatchd")]
#[command(version)]
#[command(about = "A bounded worker pool with an HTTP job intake")]
struct Args {
    /// Number of workers in the pool
    #[arg(long, default_value = "4")]
    workers: usize,

    /// Capacity of the bounded job queue
    #[arg(long, default_value = "256")]
    queue_capacity: usize,

    /// Behavior when the queue is full at submission time
    #[arg(long, value_enum, default_value_t = PolicyArg::Block)]
    submit_policy: PolicyArg,

    /// Maximum seconds to wait for a graceful drain on shutdown
    #[arg(long, default_value = "30")]
    shutdown_timeout_secs: u64,

    /// Address for the HTTP gateway
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen_addr: SocketAddr,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum PolicyArg {
    Block,
    Reject,
}

impl From<PolicyArg> for SubmitPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Block => SubmitPolicy::Block,
            PolicyArg::Reject => SubmitPolicy::Reject,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = PoolConfig::new(args.workers, args.queue_capacity)
        .with_submit_policy(args.submit_policy.into())
        .with_shutdown_timeout(Duration::from_secs(args.shutdown_timeout_secs));

    let pool = WorkerPool::start(config);
    let state = GatewayState::new(pool.handle(), pool.stats_handle());

    let shutdown = install_shutdown_handler();
    run_gateway(args.listen_addr, state, shutdown).await?;

    // Gateway is down; drain the pool before exiting.
    let report = pool.shutdown().await;
    tracing::info!(
        outcome = ?report.outcome,
        workers_stopped = report.workers_stopped,
        workers_total = report.workers_total,
        "Shutdown complete"
    );

    Ok(())
}
