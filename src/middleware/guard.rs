//! Internal page guard

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::RouterError;
use crate::AppState;

/// Refuse internal pages that were not reached through a tenant rewrite
pub async fn require_trust_marker(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let trusted = request
        .headers()
        .get(&state.trust_header)
        .map_or(false, |v| v.as_bytes() == b"true");

    if !trusted {
        tracing::debug!(path = %request.uri().path(), "internal page without trust marker");
        return RouterError::NotFound(request.uri().path().to_string()).into_response();
    }

    next.run(request).await
}
