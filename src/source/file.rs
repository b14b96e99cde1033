//! File-backed source with a small in-memory cache
//!
//! Files up to `max_cache_size` bytes are kept in memory and re-read when
//! their mtime or size changes; larger files are streamed from disk in
//! `block_size` chunks and never cached.

use crate::error::ServeError;
use crate::http::cache::CacheDirective;
use crate::http::disposition::Disposition;
use crate::http::mime;
use crate::http::payload::{Content, Payload};
use hyper::body::Bytes;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::Mutex;
use tracing::debug;

/// Default cache threshold in bytes
pub const DEFAULT_CACHE_SIZE: u64 = 4096;
/// Default streaming block size in bytes
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Cached state of the file as of `mtime`
#[derive(Debug, Default)]
struct CacheEntry {
    content: Option<Bytes>,
    mtime: Option<SystemTime>,
    size: u64,
}

/// A file served through the conditional responder
#[derive(Debug)]
pub struct CachingFileSource {
    path: PathBuf,
    max_cache_size: u64,
    block_size: usize,
    content_type: String,
    cache_control: Option<CacheDirective>,
    disposition: Option<Disposition>,
    entry: Mutex<CacheEntry>,
}

impl CachingFileSource {
    /// Wrap `path`; the content type is guessed from its extension
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let content_type = mime::guess_from_path(&path)
            .unwrap_or(mime::OCTET_STREAM)
            .to_string();
        Self {
            path,
            max_cache_size: DEFAULT_CACHE_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            content_type,
            cache_control: None,
            disposition: None,
            entry: Mutex::new(CacheEntry::default()),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, max_cache_size: u64, block_size: usize) -> Self {
        self.max_cache_size = max_cache_size;
        self.block_size = block_size.max(1);
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn with_cache_control(mut self, directive: Option<CacheDirective>) -> Self {
        self.cache_control = directive;
        self
    }

    #[must_use]
    pub fn with_disposition(mut self, disposition: Option<Disposition>) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Currently cached bytes, if any
    pub async fn cached_content(&self) -> Option<Bytes> {
        self.entry.lock().await.content.clone()
    }

    /// Produce a payload for the file's current state
    ///
    /// `force` re-reads the file even when the cached copy looks current.
    /// The cache entry stays locked for the whole check-and-update.
    pub async fn resolve(&self, force: bool) -> Result<Payload, ServeError> {
        let mut entry = self.entry.lock().await;

        let mut file = File::open(&self.path).await.map_err(|e| self.io_error(e))?;
        let meta = file.metadata().await.map_err(|e| self.io_error(e))?;
        if !meta.is_file() {
            return Err(ServeError::NotFound(self.path.clone()));
        }
        let size = meta.len();
        let mtime = meta.modified().map_err(|e| self.io_error(e))?;

        let unchanged = entry.mtime == Some(mtime) && entry.size == size;
        if unchanged && !force {
            if let Some(bytes) = &entry.content {
                return Ok(self.payload(Content::Memory(bytes.clone()), mtime));
            }
        }

        if size > self.max_cache_size {
            if entry.content.take().is_some() {
                debug!(
                    path = %self.path.display(),
                    size,
                    "File exceeds cache threshold, dropping cached copy"
                );
            }
            entry.mtime = Some(mtime);
            entry.size = size;
            let content = Content::File {
                file,
                length: size,
                block_size: self.block_size,
            };
            return Ok(self.payload(content, mtime));
        }

        let mut buf = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
        file.read_to_end(&mut buf).await.map_err(|e| self.io_error(e))?;
        let bytes = Bytes::from(buf);

        entry.mtime = Some(mtime);
        entry.size = bytes.len() as u64;
        entry.content = (entry.size <= self.max_cache_size).then(|| bytes.clone());
        debug!(path = %self.path.display(), size = entry.size, "File read into cache");

        Ok(self.payload(Content::Memory(bytes), mtime))
    }

    fn payload(&self, content: Content, mtime: SystemTime) -> Payload {
        Payload::new(content, self.content_type.clone(), mtime)
            .with_cache_control(self.cache_control.clone())
            .with_disposition(self.disposition.clone())
    }

    fn io_error(&self, err: std::io::Error) -> ServeError {
        ServeError::from_io(&self.path, err)
    }
}
