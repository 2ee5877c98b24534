//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route matching, body reading,
//! and the per-request fault boundary.

use crate::config::AppState;
use crate::handler::endpoint::{self, Endpoint};
use crate::handler::{params, usage};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/") => usage::serve_usage(),
        (&Method::POST, "/authenticate") => submit(req, Endpoint::Authenticate, &state).await,
        (&Method::POST, "/contactUS") => submit(req, Endpoint::ContactUs, &state).await,
        _ => http::build_404_response(),
    };

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(remote_addr.to_string(), method.to_string(), path);
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX));
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Read the body and hand it to the endpoint in its own task
async fn submit<B>(req: Request<B>, endpoint: Endpoint, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let max_body_size = state.config.http.max_body_size;
    let declared = params::declared_length(req.headers());
    if u64::try_from(declared).unwrap_or(u64::MAX) > max_body_size {
        logger::log_error(&format!(
            "Request body too large: {declared} bytes (max: {max_body_size})"
        ));
        return http::build_413_response();
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let mut body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => return http::build_413_response(),
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            return http::build_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Error processing request: {e}"),
            );
        }
    };
    // Only the declared length counts; no Content-Length means no body
    body.truncate(declared);

    isolate(endpoint, endpoint::handle(endpoint, body, Arc::clone(state))).await
}

/// Run `work` in its own task and wait for its response
///
/// A panic inside `work` becomes a 500. Dropping the returned future aborts
/// the task, so a cancelled connection also ends the script it started.
async fn isolate<F>(endpoint: Endpoint, work: F) -> Response<Full<Bytes>>
where
    F: Future<Output = Response<Full<Bytes>>> + Send + 'static,
{
    let mut task = JoinSet::new();
    task.spawn(work);

    let detail = match task.join_next().await {
        Some(Ok(response)) => return response,
        Some(Err(e)) => e.to_string(),
        None => "handler task missing".to_string(),
    };
    logger::log_error(&format!("Request handler for {endpoint:?} failed: {detail}"));
    http::build_error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &format!("Error processing request: {detail}"),
    )
}
