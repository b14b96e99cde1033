// Configuration types module
// Defines all configuration-related data structures

use crate::http::{CacheControl, ContentDisposition};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub cache: CacheConfig,
    pub reload: ReloadConfig,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Level or `tracing` filter directive (`RUST_LOG` takes precedence)
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Log file path (optional, stdout if not set)
    #[serde(default)]
    pub log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Upper bound for a whole connection, in seconds
    pub request_timeout: u64,
    pub max_connections: Option<u64>,
}

/// File cache configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    /// Largest file kept in memory, in bytes
    pub max_cache_size: u64,
    /// Read size when streaming larger files, in bytes
    pub block_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_cache_size: crate::source::DEFAULT_CACHE_SIZE,
            block_size: crate::source::DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Reload monitor configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReloadConfig {
    pub enabled: bool,
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub watch_files: Vec<PathBuf>,
    /// Also restart when the running binary is replaced
    #[serde(default = "default_watch_executable")]
    pub watch_executable: bool,
}

#[allow(clippy::missing_const_for_fn)]
fn default_watch_executable() -> bool {
    true
}

/// A URL path served from a source
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RouteConfig {
    /// Exact request path, e.g. `/report.pdf`
    pub path: String,
    pub source: SourceConfig,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub cache_control: Option<CacheControl>,
    #[serde(default)]
    pub disposition: Option<ContentDisposition>,
}

/// Where a route's bytes come from
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    File { path: PathBuf },
    Data { content: String },
}
