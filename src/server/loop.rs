// Server loop module
// Accepts connections until a shutdown or restart is requested

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::{ShutdownHandle, ShutdownReason};
use crate::config::AppState;
use crate::logger;

/// Why the server loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerExit {
    /// Terminal shutdown (signal)
    Shutdown,
    /// A watched file changed; the process should exit with the restart code
    Restart,
}

/// Accept connections until `shutdown` fires
///
/// The pending `accept` is abandoned as soon as shutdown is requested, so
/// the process never stays blocked in it.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<ShutdownHandle>,
) -> ServerExit {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        if let Some(reason) = shutdown.reason() {
            return exit_for(reason);
        }

        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            reason = shutdown.wait() => {
                return exit_for(reason);
            }
        }
    }
}

const fn exit_for(reason: ShutdownReason) -> ServerExit {
    match reason {
        ShutdownReason::Signal => ServerExit::Shutdown,
        ShutdownReason::Restart => ServerExit::Restart,
    }
}
