//! Request logging

use std::time::Instant;

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Request id header, echoed on the response
pub static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Logging middleware
pub async fn request_log(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let request_id = request
        .headers()
        .get(&REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID.clone(), value);
    }

    tracing::info!(
        request_id = %request_id,
        method = %method,
        host = %host,
        uri = %uri,
        status = %response.status(),
        latency_us = start.elapsed().as_micros() as u64,
        "request complete"
    );

    response
}
