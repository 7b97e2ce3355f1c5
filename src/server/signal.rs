// Signal handling module
//
// Supported signals:
// - SIGHUP:  Clear index-template and filter-pattern caches
// - SIGTERM: Stop accepting and exit
// - SIGINT:  Stop accepting and exit (Ctrl+C)

use std::sync::Arc;

use crate::config::AppState;
use crate::logger;

/// Start signal handlers (Unix only)
///
/// Spawns a background task that listens for Unix signals. Shutdown is
/// announced through `state.shutdown_signal`.
///
/// | Signal  | Action             |
/// |---------|--------------------|
/// | SIGHUP  | Clear caches       |
/// | SIGTERM | Stop server        |
/// | SIGINT  | Stop server        |
#[cfg(unix)]
pub fn start_signal_handler(state: Arc<AppState>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    logger::log_info(&format!(
        "[SIGNAL] Handlers registered (pid {}): HUP clears caches, TERM/INT stop",
        std::process::id()
    ));

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    state.clear_caches("SIGHUP");
                }
                _ = sigterm.recv() => {
                    logger::log_info("[SIGNAL] SIGTERM received, shutting down");
                    state.shutdown_signal.notify_one();
                    break;
                }
                _ = sigint.recv() => {
                    logger::log_info("[SIGNAL] SIGINT received, shutting down");
                    state.shutdown_signal.notify_one();
                    break;
                }
            }
        }
    });
    Ok(())
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(state: Arc<AppState>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_info("[SIGNAL] Ctrl+C received, shutting down");
            state.shutdown_signal.notify_one();
        }
    });
    Ok(())
}
