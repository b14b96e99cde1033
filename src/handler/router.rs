//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route lookup, and error mapping.

use crate::config::AppState;
use crate::error::ServeError;
use crate::http::{self, HttpResponse, RequestContext};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{CONTENT_LENGTH, USER_AGENT};
use hyper::{Method, Request};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    // Only GET and HEAD are served, so the request body is never read
    let (parts, _) = req.into_parts();
    let ctx = RequestContext::from_headers(&parts.method, &parts.headers);
    let response = serve(&state, parts.uri.path(), &ctx).await;

    if state.access_log_enabled() {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            parts.method.to_string(),
            parts.uri.path().to_string(),
        );
        entry.http_version = format!("{:?}", parts.version)
            .trim_start_matches("HTTP/")
            .to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        entry.range.clone_from(&ctx.range);
        entry.user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Serve `path` for the given request context
///
/// Only GET and HEAD reach the sources; errors become status responses here.
pub async fn serve(state: &AppState, path: &str, ctx: &RequestContext) -> HttpResponse {
    if ctx.method != Method::GET && ctx.method != Method::HEAD {
        logger::log_warning(&format!("Method not allowed: {}", ctx.method));
        return http::build_405_response();
    }

    let Some(source) = state.routes.get(path) else {
        return http::build_error_response(&ServeError::NotFound(path.into()));
    };

    let result = source
        .resolve(ctx.wants_revalidation())
        .await
        .and_then(|payload| state.responder.respond(payload, ctx));

    result.unwrap_or_else(|e| {
        match &e {
            ServeError::SourceUnavailable { .. } => logger::log_error(&e.to_string()),
            e if e.is_contract_violation() => logger::log_error(&format!("Route {path}: {e}")),
            ServeError::NotFound(missing) => {
                logger::log_warning(&format!("Route {path} points at missing {}", missing.display()));
            }
            _ => {}
        }
        http::build_error_response(&e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;

    fn state_with_data(content: &str) -> AppState {
        let mut cfg = Config::load_from("does-not-exist/config").unwrap();
        cfg.logging.access_log = false;
        cfg.routes = vec![crate::config::RouteConfig {
            path: "/data".into(),
            source: crate::config::SourceConfig::Data {
                content: content.into(),
            },
            content_type: None,
            cache_control: None,
            disposition: None,
        }];
        AppState::new(&cfg).unwrap()
    }

    fn get() -> RequestContext {
        RequestContext::default()
    }

    #[tokio::test]
    async fn test_serves_route() {
        let state = state_with_data("mycontent");
        let resp = serve(&state, "/data", &get()).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "application/octet-stream");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"mycontent");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let state = state_with_data("x");
        let resp = serve(&state, "/missing", &get()).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_post_is_405() {
        let state = state_with_data("x");
        let ctx = RequestContext {
            method: Method::POST,
            ..get()
        };
        let resp = serve(&state, "/data", &ctx).await;
        assert_eq!(resp.status(), 405);
    }

    #[tokio::test]
    async fn test_bad_timestamp_is_400() {
        let state = state_with_data("x");
        let ctx = RequestContext {
            if_modified_since: Some("garbage".into()),
            ..get()
        };
        let resp = serve(&state, "/data", &ctx).await;
        assert_eq!(resp.status(), 400);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("ill-formed timestamp"));
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::load_from("does-not-exist/config").unwrap();
        cfg.routes = vec![crate::config::RouteConfig {
            path: "/gone".into(),
            source: crate::config::SourceConfig::File {
                path: dir.path().join("gone.txt"),
            },
            content_type: None,
            cache_control: None,
            disposition: None,
        }];
        let state = AppState::new(&cfg).unwrap();
        let resp = serve(&state, "/gone", &get()).await;
        assert_eq!(resp.status(), 404);
    }
}
