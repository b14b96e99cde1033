//! HTTP response building module
//!
//! Provides builders for various HTTP status code responses, decoupled from specific business logic.

use crate::error::ServeError;
use crate::http::body::ResponseBody;
use crate::http::range::ByteRange;
use hyper::Response;

/// Response type produced by the responder and the handler
pub type HttpResponse = Response<ResponseBody>;

/// Entity headers shared by 200, 206 and 304 responses
#[derive(Debug, Clone, Default)]
pub struct EntityHeaders {
    pub content_type: String,
    pub last_modified: String,
    pub cache_control: Option<String>,
    pub expires: Option<String>,
    pub disposition: Option<String>,
}

impl EntityHeaders {
    fn apply_validators(
        &self,
        mut builder: hyper::http::response::Builder,
    ) -> hyper::http::response::Builder {
        builder = builder.header("Last-Modified", &self.last_modified);
        if let Some(cc) = &self.cache_control {
            builder = builder.header("Cache-Control", cc);
        }
        if let Some(expires) = &self.expires {
            builder = builder.header("Expires", expires);
        }
        builder
    }
}

/// Build 200 OK response carrying the whole entity
pub fn build_full_response(
    body: ResponseBody,
    content_length: u64,
    headers: &EntityHeaders,
) -> HttpResponse {
    let mut builder = Response::builder()
        .status(200)
        .header("Content-Type", &headers.content_type)
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "bytes");
    builder = headers.apply_validators(builder);
    if let Some(disposition) = &headers.disposition {
        builder = builder.header("Content-Disposition", disposition);
    }

    builder.body(body).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(ResponseBody::empty())
    })
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    body: ResponseBody,
    range: ByteRange,
    total_size: u64,
    headers: &EntityHeaders,
) -> HttpResponse {
    let mut builder = Response::builder()
        .status(206)
        .header("Content-Type", &headers.content_type)
        .header("Content-Length", range.len())
        .header("Content-Range", range.content_range(total_size))
        .header("Accept-Ranges", "bytes");
    builder = headers.apply_validators(builder);
    if let Some(disposition) = &headers.disposition {
        builder = builder.header("Content-Disposition", disposition);
    }

    builder.body(body).unwrap_or_else(|e| {
        log_build_error("206", &e);
        Response::new(ResponseBody::empty())
    })
}

/// Build 304 Not Modified response (no content headers)
pub fn build_304_response(headers: &EntityHeaders) -> HttpResponse {
    let builder = headers.apply_validators(Response::builder().status(304));
    builder.body(ResponseBody::empty()).unwrap_or_else(|e| {
        log_build_error("304", &e);
        Response::new(ResponseBody::empty())
    })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> HttpResponse {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD")
        .body(ResponseBody::full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(ResponseBody::full("405 Method Not Allowed"))
        })
}

/// Build the client-facing response for a serving error
///
/// Client errors carry their diagnostic text; server-side failures get a
/// generic body so paths and I/O details are not leaked.
pub fn build_error_response(error: &ServeError) -> HttpResponse {
    let status = error.status();
    let message = match error {
        ServeError::MalformedTimestamp(_) | ServeError::ClockSkew => error.to_string(),
        ServeError::NotFound(_) => "404 Not Found".to_string(),
        ServeError::UnsatisfiableRange { .. } => "Range Not Satisfiable".to_string(),
        _ => "500 Internal Server Error".to_string(),
    };

    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .header("Content-Length", message.len());
    if let ServeError::UnsatisfiableRange { length } = error {
        builder = builder.header("Content-Range", format!("bytes */{length}"));
    }

    builder
        .body(ResponseBody::full(message.clone()))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            Response::new(ResponseBody::full(message))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_statuses() {
        let resp = build_error_response(&ServeError::ClockSkew);
        assert_eq!(resp.status(), 400);

        let resp = build_error_response(&ServeError::NotFound(PathBuf::from("/x")));
        assert_eq!(resp.status(), 404);

        let resp = build_error_response(&ServeError::UnsatisfiableRange { length: 42 });
        assert_eq!(resp.status(), 416);
        assert_eq!(resp.headers()["content-range"], "bytes */42");
    }

    #[test]
    fn test_304_has_no_content_headers() {
        let headers = EntityHeaders {
            content_type: "text/plain".into(),
            last_modified: "Sun, 06 Nov 1994 08:49:37 GMT".into(),
            cache_control: Some("public".into()),
            ..Default::default()
        };
        let resp = build_304_response(&headers);
        assert_eq!(resp.status(), 304);
        assert!(resp.headers().get("content-type").is_none());
        assert!(resp.headers().get("content-length").is_none());
        assert_eq!(resp.headers()["last-modified"], "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_405_allow_header() {
        let resp = build_405_response();
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers()["allow"], "GET, HEAD");
    }
}
