//! HTTP front-end adapter.
//!
//! Turns inbound requests into jobs and submits them through the pool's
//! submission interface, translating backpressure into HTTP status codes.
//! The gateway is a caller of the core only; it never touches queue or
//! worker internals.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::dispatch::{Job, JobQueue};
use crate::error::PoolError;
use crate::pool::{PoolStats, StatsHandle};

#[derive(Clone)]
pub struct GatewayState {
    queue: JobQueue,
    stats: StatsHandle,
}

impl GatewayState {
    pub fn new(queue: JobQueue, stats: StatsHandle) -> Self {
        Self { queue, stats }
    }
}

#[derive(Deserialize)]
struct SubmitJobRequest {
    /// Opaque payload echoed back as the job's output.
    payload: String,
    /// Simulated work duration in milliseconds.
    #[serde(default)]
    delay_ms: u64,
}

#[derive(Serialize)]
struct SubmitJobResponse {
    job_id: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/jobs", post(submit_job_handler))
        .route("/api/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the gateway until the shutdown token fires.
pub async fn run_gateway(
    addr: SocketAddr,
    state: GatewayState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Gateway listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn submit_job_handler(
    State(state): State<GatewayState>,
    Json(req): Json<SubmitJobRequest>,
) -> Response {
    let delay = Duration::from_millis(req.delay_ms);
    let payload = req.payload;
    let job = Job::new(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(Some(payload))
    });

    tracing::debug!(job_id = %job.id, "Submitting job from gateway");
    match state.queue.submit(job).await {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(SubmitJobResponse {
                job_id: job_id.to_string(),
            }),
        )
            .into_response(),
        Err(err) => reject(err),
    }
}

async fn status_handler(State(state): State<GatewayState>) -> Json<PoolStats> {
    Json(state.stats.snapshot())
}

fn reject(err: PoolError) -> Response {
    let status = match err {
        PoolError::QueueFull => StatusCode::TOO_MANY_REQUESTS,
        PoolError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        PoolError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        PoolError::InvariantViolation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}
