use tokio_util::sync::CancellationToken;

/// Install a shutdown handler that listens for Ctrl-C (and SIGTERM on unix).
///
/// Returns a `CancellationToken` that is cancelled when a signal is received.
/// The gateway stops accepting connections on it; the pool is then drained.
pub fn install_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received Ctrl-C, initiating graceful shutdown");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received Ctrl-C, initiating graceful shutdown");
        }

        token_clone.cancel();
    });

    token
}
