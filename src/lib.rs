//! Conditional, range-aware file serving
//!
//! Serves configured routes backed by files (cached in memory below a size
//! threshold, streamed above it) or in-memory data, honoring
//! `If-Modified-Since`, `Range`, `Cache-Control` and `Content-Disposition`
//! policies. A polling reload monitor restarts the process when watched
//! files change.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod reload;
pub mod server;
pub mod source;

pub use error::ServeError;
