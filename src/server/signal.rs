// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)
//
// Restarts are requested by the reload monitor through the same handle.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Why the server was asked to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGTERM or SIGINT
    Signal,
    /// A watched file changed
    Restart,
}

const NONE: u8 = 0;
const SIGNAL: u8 = 1;
const RESTART: u8 = 2;

/// Shared shutdown state; the first request wins
#[derive(Debug, Default)]
pub struct ShutdownHandle {
    reason: AtomicU8,
    notify: Notify,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown; later requests keep the first reason
    pub fn trigger(&self, reason: ShutdownReason) {
        let code = match reason {
            ShutdownReason::Signal => SIGNAL,
            ShutdownReason::Restart => RESTART,
        };
        let _ = self
            .reason
            .compare_exchange(NONE, code, Ordering::SeqCst, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        match self.reason.load(Ordering::SeqCst) {
            SIGNAL => Some(ShutdownReason::Signal),
            RESTART => Some(ShutdownReason::Restart),
            _ => None,
        }
    }

    /// Wait until shutdown is requested
    pub async fn wait(&self) -> ShutdownReason {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking, so a trigger in between is not lost
            notified.as_mut().enable();
            if let Some(reason) = self.reason() {
                return reason;
            }
            notified.await;
        }
    }
}

/// Start signal handlers (Unix only)
///
/// Spawns a background task that turns SIGTERM and SIGINT into a
/// [`ShutdownReason::Signal`] request.
#[cfg(unix)]
pub fn start_signal_handler(handle: Arc<ShutdownHandle>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_error(&format!("Failed to register signal handlers: {e}"));
                    return;
                }
            };

        tracing::info!("[SIGNAL] Process ID: {}", std::process::id());

        tokio::select! {
            _ = sigterm.recv() => logger::log_shutdown("SIGTERM received, shutting down"),
            _ = sigint.recv() => logger::log_shutdown("SIGINT received, shutting down"),
        }
        handle.trigger(ShutdownReason::Signal);
    });
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handle: Arc<ShutdownHandle>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_shutdown("Ctrl+C received, shutting down");
            handle.trigger(ShutdownReason::Signal);
        }
    });
}
