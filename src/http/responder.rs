//! Conditional, range-aware responder
//!
//! Turns a [`Payload`] and the request's conditional headers into a 200,
//! 206 or 304 response. Stateless apart from the clock it reads.

use crate::error::ServeError;
use crate::http::cache;
use crate::http::clock::{Clock, SystemClock};
use crate::http::date;
use crate::http::payload::Payload;
use crate::http::range::{self, RangeParseResult};
use crate::http::response::{self, EntityHeaders, HttpResponse};
use crate::http::body::ResponseBody;
use hyper::header::{CACHE_CONTROL, IF_MODIFIED_SINCE, RANGE};
use hyper::{HeaderMap, Method};

/// Request information consumed by the responder
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub method: Method,
    pub if_modified_since: Option<String>,
    pub range: Option<String>,
    pub cache_control: Option<String>,
}

impl RequestContext {
    /// Extract the relevant headers (names are case-insensitive)
    pub fn from_headers(method: &Method, headers: &HeaderMap) -> Self {
        let get = |name| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        Self {
            method: method.clone(),
            // Non-UTF-8 dates must still fail the timestamp check, not vanish
            if_modified_since: headers
                .get(IF_MODIFIED_SINCE)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned()),
            range: get(RANGE),
            cache_control: get(CACHE_CONTROL),
        }
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    /// Only retrieval methods honor Range
    pub fn supports_ranges(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }

    /// Whether the client asked for end-to-end revalidation
    pub fn wants_revalidation(&self) -> bool {
        cache::requires_revalidation(self.cache_control.as_deref())
    }
}

/// Builds responses from payloads and request headers
#[derive(Debug, Clone, Default)]
pub struct ConditionalResponder<C = SystemClock> {
    clock: C,
}

impl ConditionalResponder<SystemClock> {
    pub const fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> ConditionalResponder<C> {
    pub const fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Produce the response for `payload`
    ///
    /// Order: `If-Modified-Since` (400 on bad or future dates, 304 when
    /// fresh), then `Range` (206 for a single partial range, 416 when
    /// unsatisfiable), otherwise 200 with the full entity.
    pub fn respond(&self, payload: Payload, req: &RequestContext) -> Result<HttpResponse, ServeError> {
        let now = self.clock.now();
        let headers = entity_headers(&payload, now);

        if let Some(value) = req.if_modified_since.as_deref() {
            let client = date::parse_http_date(value)
                .ok_or_else(|| ServeError::MalformedTimestamp(value.to_string()))?;
            let client = date::unix_seconds(client);
            if client > date::unix_seconds(now) {
                return Err(ServeError::ClockSkew);
            }
            if client >= date::unix_seconds(payload.last_modified) {
                return Ok(response::build_304_response(&headers));
            }
        }

        let total = payload.len();
        let range = if req.supports_ranges() {
            match range::parse_range_header(req.range.as_deref(), total) {
                RangeParseResult::Partial(r) => Some(r),
                RangeParseResult::NotSatisfiable => {
                    return Err(ServeError::UnsatisfiableRange { length: total });
                }
                RangeParseResult::Full | RangeParseResult::None => None,
            }
        } else {
            None
        };

        let body = if req.is_head() {
            ResponseBody::empty()
        } else {
            payload.into_body(range)
        };

        Ok(match range {
            Some(r) => response::build_partial_response(body, r, total, &headers),
            None => response::build_full_response(body, total, &headers),
        })
    }
}

fn entity_headers(payload: &Payload, now: std::time::SystemTime) -> EntityHeaders {
    let (cache_control, expires) = payload.cache_control.as_ref().map_or((None, None), |d| {
        (
            Some(d.header.clone()),
            d.expires.at(now).map(date::format_http_date),
        )
    });

    EntityHeaders {
        content_type: payload.effective_content_type().to_string(),
        last_modified: date::format_http_date(payload.last_modified),
        cache_control,
        expires,
        disposition: payload.disposition.as_ref().map(|d| d.header_value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::clock::FixedClock;
    use http_body_util::BodyExt;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    const NOW: u64 = 1_700_000_000;

    fn responder() -> ConditionalResponder<FixedClock> {
        ConditionalResponder::with_clock(FixedClock(UNIX_EPOCH + Duration::from_secs(NOW)))
    }

    fn payload(content: &'static str) -> Payload {
        // Sub-second part must be ignored by the conditional check
        let modified = UNIX_EPOCH + Duration::from_millis((NOW - 100) * 1000 + 400);
        Payload::from_bytes(content, "text/plain", modified)
    }

    fn request() -> RequestContext {
        RequestContext::default()
    }

    async fn body_of(resp: HttpResponse) -> Vec<u8> {
        resp.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[tokio::test]
    async fn test_full_response() {
        let resp = responder().respond(payload("mycontent"), &request()).unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-length"], "9");
        assert_eq!(resp.headers()["content-type"], "text/plain");
        assert_eq!(resp.headers()["accept-ranges"], "bytes");
        assert!(resp.headers().get("cache-control").is_none());
        assert_eq!(body_of(resp).await, b"mycontent");
    }

    #[tokio::test]
    async fn test_head_has_headers_only() {
        let req = RequestContext {
            method: Method::HEAD,
            ..request()
        };
        let resp = responder().respond(payload("mycontent"), &req).unwrap();
        assert_eq!(resp.headers()["content-length"], "9");
        assert!(body_of(resp).await.is_empty());
    }

    #[test]
    fn test_not_modified() {
        let r = responder();
        let first = r.respond(payload("mycontent"), &request()).unwrap();
        let last_modified = first.headers()["last-modified"].to_str().unwrap().to_string();

        let req = RequestContext {
            if_modified_since: Some(last_modified),
            ..request()
        };
        let resp = r.respond(payload("mycontent"), &req).unwrap();
        assert_eq!(resp.status(), 304);
        assert!(resp.headers().get("content-length").is_none());
    }

    #[test]
    fn test_modified_since_older_date() {
        let req = RequestContext {
            if_modified_since: Some("Sun, 06 Nov 1994 08:49:37 GMT".into()),
            ..request()
        };
        let resp = responder().respond(payload("mycontent"), &req).unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[test]
    fn test_bad_timestamps() {
        let req = RequestContext {
            if_modified_since: Some("garbage".into()),
            ..request()
        };
        let err = responder().respond(payload("x"), &req).unwrap_err();
        assert!(matches!(err, ServeError::MalformedTimestamp(_)));

        let req = RequestContext {
            if_modified_since: Some("Thu, 22 Dec 2030 01:01:01 GMT".into()),
            ..request()
        };
        let err = responder().respond(payload("x"), &req).unwrap_err();
        assert!(matches!(err, ServeError::ClockSkew));
    }

    #[test]
    fn test_non_utf8_timestamp_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            IF_MODIFIED_SINCE,
            hyper::header::HeaderValue::from_bytes(b"Thu, 01 Jan 2000 \xff").unwrap(),
        );
        let req = RequestContext::from_headers(&Method::GET, &headers);
        let err = responder().respond(payload("x"), &req).unwrap_err();
        assert!(matches!(err, ServeError::MalformedTimestamp(_)));
        assert_eq!(err.status(), 400);
    }

    #[tokio::test]
    async fn test_partial_response() {
        let req = RequestContext {
            range: Some("bytes=3-17".into()),
            ..request()
        };
        let content = "abcdefghijklmnopqrstuvwxyz";
        let resp = responder().respond(payload(content), &req).unwrap();
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["content-length"], "15");
        assert_eq!(resp.headers()["content-range"], "bytes 3-17/26");
        assert_eq!(body_of(resp).await, &content.as_bytes()[3..18]);
    }

    #[tokio::test]
    async fn test_full_coverage_range_is_200() {
        let req = RequestContext {
            range: Some("bytes=0-8".into()),
            ..request()
        };
        let resp = responder().respond(payload("mycontent"), &req).unwrap();
        assert_eq!(resp.status(), 200);
        assert!(resp.headers().get("content-range").is_none());
        assert_eq!(body_of(resp).await, b"mycontent");
    }

    #[test]
    fn test_range_ignored_for_post() {
        let req = RequestContext {
            method: Method::POST,
            range: Some("bytes=0-1".into()),
            ..request()
        };
        let resp = responder().respond(payload("mycontent"), &req).unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[test]
    fn test_unsatisfiable_range() {
        let req = RequestContext {
            range: Some("bytes=100-".into()),
            ..request()
        };
        let err = responder().respond(payload("mycontent"), &req).unwrap_err();
        assert!(matches!(err, ServeError::UnsatisfiableRange { length: 9 }));
    }

    #[test]
    fn test_expires_follows_clock() {
        let directive = cache::CacheControl {
            max_age: Some(60),
            ..Default::default()
        }
        .build()
        .unwrap();
        let resp = responder()
            .respond(payload("x").with_cache_control(Some(directive)), &request())
            .unwrap();
        let expires = resp.headers()["expires"].to_str().unwrap();
        let expires = date::parse_http_date(expires).unwrap();
        assert_eq!(
            expires,
            SystemTime::UNIX_EPOCH + Duration::from_secs(NOW + 60)
        );
    }

    #[test]
    fn test_request_context_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("RANGE", "bytes=0-1".parse().unwrap());
        headers.insert("cache-control", "max-age=0".parse().unwrap());
        let ctx = RequestContext::from_headers(&Method::GET, &headers);
        assert_eq!(ctx.range.as_deref(), Some("bytes=0-1"));
        assert!(ctx.if_modified_since.is_none());
        assert!(ctx.wants_revalidation());
    }
}
