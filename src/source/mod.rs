//! Content sources
//!
//! A source produces a fresh [`Payload`] per request; the file source keeps
//! its cache across requests.

pub mod data;
pub mod file;

pub use data::DataSource;
pub use file::{CachingFileSource, DEFAULT_BLOCK_SIZE, DEFAULT_CACHE_SIZE};

use crate::config::{CacheConfig, RouteConfig, SourceConfig};
use crate::error::ServeError;
use crate::http::payload::Payload;

/// A configured source behind a route
#[derive(Debug)]
pub enum Source {
    File(CachingFileSource),
    Data(DataSource),
}

impl Source {
    /// Build a source from route configuration
    ///
    /// Cache-control and disposition conflicts are rejected here, so a
    /// misconfigured route never reaches request handling.
    pub fn from_config(route: &RouteConfig, cache: &CacheConfig) -> Result<Self, ServeError> {
        let cache_control = route
            .cache_control
            .as_ref()
            .map(crate::http::CacheControl::build)
            .transpose()?;
        let disposition = route
            .disposition
            .as_ref()
            .map(crate::http::ContentDisposition::build)
            .transpose()?;

        let source = match &route.source {
            SourceConfig::File { path } => {
                let mut file = CachingFileSource::new(path)
                    .with_limits(cache.max_cache_size, cache.block_size)
                    .with_cache_control(cache_control)
                    .with_disposition(disposition);
                if let Some(content_type) = &route.content_type {
                    file = file.with_content_type(content_type.clone());
                }
                Self::File(file)
            }
            SourceConfig::Data { content } => {
                let mut data = DataSource::new(content.clone())
                    .with_cache_control(cache_control)
                    .with_disposition(disposition);
                if let Some(content_type) = &route.content_type {
                    data = data.with_content_type(content_type.clone());
                }
                Self::Data(data)
            }
        };
        Ok(source)
    }

    /// Resolve the current payload; `force` bypasses the file cache
    pub async fn resolve(&self, force: bool) -> Result<Payload, ServeError> {
        match self {
            Self::File(file) => file.resolve(force).await,
            Self::Data(data) => Ok(data.resolve().await),
        }
    }
}
