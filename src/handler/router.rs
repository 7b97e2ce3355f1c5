//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, per-request
//! overrides, route matching, then content resolution and serving.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HOST, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use percent_encoding::percent_decode_str;

use crate::config::AppState;
use crate::handler::{static_files, Resolution};
use crate::http::{self, RequestOverrides};
use crate::logger::{self, AccessLogEntry};

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Path as received, for access logs
    pub raw_path: String,
    /// Percent-decoded path used for matching and joining
    pub path: String,
    pub query: Option<String>,
    pub overrides: RequestOverrides,
    /// Host header value, empty when absent
    pub host: String,
    pub is_head: bool,
    pub http_version: &'static str,
    pub remote_addr: String,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>, peer: SocketAddr) -> Self {
        let uri = req.uri();
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        let raw_path = uri.path().to_string();
        Self {
            method: req.method().clone(),
            path: decode_path(&raw_path),
            raw_path,
            query: uri.query().map(ToString::to_string),
            overrides: RequestOverrides::from_query(uri.query()),
            host: header(HOST)
                .or_else(|| uri.authority().map(ToString::to_string))
                .unwrap_or_default(),
            is_head: req.method() == Method::HEAD,
            http_version: version_str(req.version()),
            remote_addr: peer.ip().to_string(),
            referer: header(REFERER),
            user_agent: header(USER_AGENT),
        }
    }

    /// Absolute URL of the request handed to index templates
    pub fn host_url(&self, scheme: &str) -> String {
        format!("{scheme}://{}{}", self.host, self.path)
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let ctx = RequestContext::from_request(&req, peer);
    Ok(dispatch(ctx, &state).await)
}

/// Process a request context and write the access log line
pub async fn dispatch(ctx: RequestContext, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let start = Instant::now();
    let response = route_request(&ctx, state).await;

    if state.access_log_enabled() {
        log_access(&ctx, &response, start, &state.config.logging.access_log_format);
    }
    response
}

async fn route_request(ctx: &RequestContext, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&ctx.method) {
        return resp;
    }

    // 2. Per-request cache clear happens before anything is resolved
    if ctx.overrides.clear_cache {
        let templates = state.resolver.templates().len();
        state.resolver.clear_templates();
        logger::log_cache_cleared("clearcache query parameter", templates, None);
    }

    // 3. First matching route in priority order
    let Some(route) = state.routes.match_path(&ctx.path) else {
        logger::log_debug(&format!("No route matches {}", ctx.path));
        return http::build_empty_response();
    };

    // 4. Resolution touches the filesystem and may compile a template
    let resolver = Arc::clone(&state.resolver);
    let route = Arc::clone(route);
    let path = ctx.path.clone();
    let host = ctx.host_url(state.config.server.scheme());
    let overrides = ctx.overrides;
    let resolution = tokio::task::spawn_blocking(move || {
        resolver.resolve(&route, &path, &host, overrides)
    })
    .await;

    match resolution {
        Ok(Resolution::Index(body)) => http::build_html_response(body, ctx.is_head),
        Ok(Resolution::File(target)) => static_files::serve_file(&target, ctx.is_head).await,
        Err(e) => {
            logger::log_error(&format!("Resolution task failed for {}: {e}", ctx.path));
            http::build_500_response()
        }
    }
}

/// Only GET and HEAD are served
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

fn log_access(
    ctx: &RequestContext,
    response: &Response<Full<Bytes>>,
    start: Instant,
    format: &str,
) {
    let mut entry = AccessLogEntry::new(
        ctx.remote_addr.clone(),
        ctx.method.to_string(),
        ctx.raw_path.clone(),
    );
    entry.query.clone_from(&ctx.query);
    entry.http_version = ctx.http_version.to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
        .unwrap_or(usize::MAX);
    entry.referer.clone_from(&ctx.referer);
    entry.user_agent.clone_from(&ctx.user_agent);
    entry.request_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(&entry, format);
}
