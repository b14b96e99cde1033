//! Response content plus the metadata the responder needs

use crate::http::body::{FileStream, ResponseBody};
use crate::http::cache::CacheDirective;
use crate::http::disposition::Disposition;
use crate::http::range::ByteRange;
use hyper::body::Bytes;
use std::time::SystemTime;
use tokio::fs::File;

/// Payload bytes, resident or still on disk
#[derive(Debug)]
pub enum Content {
    Memory(Bytes),
    File {
        file: File,
        length: u64,
        block_size: usize,
    },
}

/// Content with its type, timestamp and header policies
#[derive(Debug)]
pub struct Payload {
    pub content: Content,
    pub content_type: String,
    pub last_modified: SystemTime,
    pub cache_control: Option<CacheDirective>,
    pub disposition: Option<Disposition>,
}

impl Payload {
    pub fn from_bytes(
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
        last_modified: SystemTime,
    ) -> Self {
        Self::new(Content::Memory(data.into()), content_type, last_modified)
    }

    pub fn new(content: Content, content_type: impl Into<String>, last_modified: SystemTime) -> Self {
        Self {
            content,
            content_type: content_type.into(),
            last_modified,
            cache_control: None,
            disposition: None,
        }
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

    /// Total content length in bytes
    pub fn len(&self) -> u64 {
        match &self.content {
            Content::Memory(data) => data.len() as u64,
            Content::File { length, .. } => *length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Effective Content-Type; a disposition overrides the payload's own type
    pub fn effective_content_type(&self) -> &str {
        self.disposition
            .as_ref()
            .map_or(self.content_type.as_str(), |d| d.content_type())
    }

    /// Consume the payload into a body covering `range`, or everything
    pub fn into_body(self, range: Option<ByteRange>) -> ResponseBody {
        match self.content {
            Content::Memory(data) => match range {
                Some(r) => {
                    let start = usize::try_from(r.start).unwrap_or(usize::MAX);
                    let end = usize::try_from(r.end).unwrap_or(usize::MAX);
                    ResponseBody::full(data.slice(start..=end))
                }
                None => ResponseBody::full(data),
            },
            Content::File {
                file,
                length,
                block_size,
            } => {
                let (offset, len) = range.map_or((0, length), |r| (r.start, r.len()));
                ResponseBody::File(FileStream::new(file, offset, len, block_size))
            }
        }
    }
}
