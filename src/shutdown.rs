//! Graceful shutdown handler.

use tokio::sync::watch;

/// First Ctrl+C stops scheduling new visits and lets in-flight ones finish.
/// Second Ctrl+C exits immediately.
pub fn setup_shutdown_handler() -> watch::Receiver<bool> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!(
                "Received Ctrl+C, finishing in-flight pages (press again to force quit)"
            );
            let _ = shutdown_tx.send(true);

            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::error!("Force quit requested, exiting immediately");
                std::process::exit(130);
            }
        }
    });

    shutdown_rx
}
