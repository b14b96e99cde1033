// Server module entry point
// Listener setup, connection serving, shutdown and restart signalling

pub mod connection;
pub mod listener;
pub mod signal;

// Rust does not allow `loop` as a module name (keyword), use server_loop instead
#[path = "loop.rs"]
pub mod server_loop;

// Re-export commonly used types
pub use listener::create_reusable_listener;
pub use server_loop::{start_server_loop, ServerExit};
pub use signal::{start_signal_handler, ShutdownHandle, ShutdownReason};
