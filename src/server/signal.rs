// Signal handling module
//
// Shutdown triggers:
// - SIGINT (Ctrl+C)
// - SIGTERM (unix only)

use crate::logger;
use std::future::pending;

/// Resolves when the process is asked to stop.
///
/// If a handler cannot be registered that trigger is ignored; the other one
/// still works.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger::log_warning(&format!("Failed to listen for Ctrl+C: {e}"));
            pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => logger::log_info("SIGINT received"),
        () = terminate() => logger::log_info("SIGTERM received"),
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            pending::<()>().await;
        }
    }
}

/// Windows fallback - only Ctrl+C is supported
#[cfg(not(unix))]
async fn terminate() {
    pending::<()>().await;
}
