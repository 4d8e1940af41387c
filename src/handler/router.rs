//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, the root vs.
//! file split, error mapping and access logging.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{HeaderValue, REFERER, SERVER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub range_header: Option<String>,
}

/// Main entry point for HTTP request handling
///
/// Generic over the body type since request bodies are never read; the body
/// is dropped up front.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (req, _) = req.into_parts();

    logger::log_headers_count(req.headers.len(), state.config.logging.show_headers);

    let mut response = if let Some(resp) = check_http_method(&req.method) {
        resp
    } else if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        resp
    } else {
        let ctx = RequestContext {
            path: req.uri.path(),
            is_head: req.method == Method::HEAD,
            range_header: header_string(&req, hyper::header::RANGE),
        };
        route_request(&ctx, &state).await
    };

    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, value);
    }

    if state.access_log() {
        log_access(&req, &response, peer_addr, started, &state);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(req: &Parts, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// `/` is the index document, everything else is a file lookup
async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let result = if ctx.path == "/" {
        static_files::serve_root(&state.root).await
    } else {
        static_files::serve_static(&state.root, ctx.path).await
    };

    match result {
        Ok(file) => {
            logger::log_debug(&format!("{} -> {}", ctx.path, file.path.display()));
            static_files::build_static_file_response(ctx, &file)
        }
        Err(err) => error_response(&err),
    }
}

fn error_response(err: &ServeError) -> Response<Full<Bytes>> {
    match err {
        ServeError::NotFound { .. } => {
            logger::log_debug(&err.to_string());
            http::build_404_response()
        }
        ServeError::Forbidden { .. } => {
            logger::log_warning(&format!("Path traversal attempt blocked: {err}"));
            http::build_404_response()
        }
        ServeError::Io { .. } => {
            logger::log_error(&err.to_string());
            http::build_500_response()
        }
    }
}

fn header_string(req: &Parts, name: hyper::header::HeaderName) -> Option<String> {
    req.headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn log_access(
    req: &Parts,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version)
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_string(req, REFERER);
    entry.user_agent = header_string(req, USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.access_log_format);
}
