//! In-memory source whose content can be replaced at runtime

use crate::http::cache::CacheDirective;
use crate::http::disposition::Disposition;
use crate::http::mime;
use crate::http::payload::Payload;
use hyper::body::Bytes;
use std::time::SystemTime;
use tokio::sync::RwLock;

#[derive(Debug)]
struct DataState {
    content: Bytes,
    last_modified: SystemTime,
}

/// Static bytes served through the conditional responder
#[derive(Debug)]
pub struct DataSource {
    state: RwLock<DataState>,
    content_type: String,
    cache_control: Option<CacheDirective>,
    disposition: Option<Disposition>,
}

impl DataSource {
    /// New source stamped with the current time, typed `application/octet-stream`
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self {
            state: RwLock::new(DataState {
                content: content.into(),
                last_modified: SystemTime::now(),
            }),
            content_type: mime::OCTET_STREAM.to_string(),
            cache_control: None,
            disposition: None,
        }
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

    /// Replace the content and stamp a new last-modified time
    pub async fn set_content(&self, content: impl Into<Bytes>) {
        let mut state = self.state.write().await;
        state.content = content.into();
        state.last_modified = SystemTime::now();
    }

    pub async fn resolve(&self) -> Payload {
        let state = self.state.read().await;
        Payload::from_bytes(
            state.content.clone(),
            self.content_type.clone(),
            state.last_modified,
        )
        .with_cache_control(self.cache_control.clone())
        .with_disposition(self.disposition.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::payload::Content;

    fn content_of(payload: &Payload) -> &[u8] {
        match &payload.content {
            Content::Memory(data) => data,
            Content::File { .. } => panic!("expected memory content"),
        }
    }

    #[tokio::test]
    async fn test_defaults() {
        let source = DataSource::new("mycontent");
        let payload = source.resolve().await;
        assert_eq!(payload.content_type, "application/octet-stream");
        assert_eq!(payload.len(), 9);
        assert_eq!(content_of(&payload), b"mycontent");
    }

    #[tokio::test]
    async fn test_set_content() {
        let source = DataSource::new("mycontent");
        let before = source.resolve().await.last_modified;
        source.set_content("bingles").await;

        let payload = source.resolve().await;
        assert_eq!(content_of(&payload), b"bingles");
        assert!(payload.last_modified >= before);
    }
}
