//! Request logging middleware.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Log method, path, status and elapsed time of every request.
pub async fn request_log_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_client_error() || status.is_server_error() {
        tracing::warn!(%method, %path, status = status.as_u16(), elapsed_ms, "Request failed");
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), elapsed_ms, "Request completed");
    }

    response
}
