//! Request handler module
//!
//! Maps request paths onto configured sources and runs them through the
//! conditional responder.

pub mod router;

// Re-export main entry point
pub use router::{handle_request, serve};
