//! Tenant routing middleware
//!
//! Runs the dispatcher for every request and applies its decision: a 3xx
//! redirect, a same-origin URI rewrite carrying the trust marker, or nothing.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::dispatch::{dispatch, Dispatch, RedirectTarget};
use crate::error::RouterError;
use crate::request::RequestContext;
use crate::AppState;

/// Resolve the tenant and redirect or rewrite accordingly
pub async fn tenant_routing(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    // Only this middleware may set the trust marker.
    request.headers_mut().remove(&state.trust_header);

    let principal = state.sessions.principal(request.headers());
    let ctx = RequestContext::from_http(request.headers(), request.uri(), principal.clone());

    match dispatch(&ctx, &state.config) {
        Dispatch::Redirect(target) => {
            tracing::info!(
                host = ?ctx.host,
                path = %ctx.pathname,
                location = %target.location,
                status = %target.kind.status(),
                "tenant redirect"
            );
            redirect_response(&target)
        }
        Dispatch::Rewrite { tenant, target } => {
            let uri = match rewrite_uri(request.uri(), &target.internal_path) {
                Ok(uri) => uri,
                Err(e) => return e.into_response(),
            };
            tracing::debug!(
                tenant = tenant.kind(),
                from = %ctx.pathname,
                to = %target.internal_path,
                "tenant rewrite"
            );
            *request.uri_mut() = uri;
            if target.trust_marker {
                request
                    .headers_mut()
                    .insert(state.trust_header.clone(), HeaderValue::from_static("true"));
            }
            if let Some(principal) = principal {
                request.extensions_mut().insert(principal);
            }
            next.run(request).await
        }
        Dispatch::Passthrough => {
            if let Some(principal) = principal {
                request.extensions_mut().insert(principal);
            }
            next.run(request).await
        }
    }
}

/// Redirect response with a `Location` header
pub fn redirect_response(target: &RedirectTarget) -> Response {
    match HeaderValue::from_str(&target.location) {
        Ok(location) => (target.kind.status(), [(header::LOCATION, location)]).into_response(),
        Err(_) => RouterError::InvalidUri(target.location.clone()).into_response(),
    }
}

/// Replace the path of `uri`, keeping its query
pub fn rewrite_uri(uri: &Uri, internal_path: &str) -> Result<Uri, RouterError> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{internal_path}?{query}"),
        None => internal_path.to_string(),
    };
    path_and_query
        .parse::<Uri>()
        .map_err(|e| RouterError::InvalidUri(format!("{path_and_query}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::RedirectKind;
    use axum::http::StatusCode;

    #[test]
    fn test_rewrite_keeps_query() {
        let uri: Uri = "/alice/talk?slide=4".parse().unwrap();
        let rewritten = rewrite_uri(&uri, "/view/free/alice/talk").unwrap();
        assert_eq!(rewritten.path(), "/view/free/alice/talk");
        assert_eq!(rewritten.query(), Some("slide=4"));
    }

    #[test]
    fn test_redirect_response() {
        let response = redirect_response(&RedirectTarget {
            location: "https://acme.pr.djl.foundation/manage".into(),
            kind: RedirectKind::Permanent,
        });
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://acme.pr.djl.foundation/manage"
        );
    }

    #[test]
    fn test_unencodable_location_is_bad_request() {
        let response = redirect_response(&RedirectTarget {
            location: "https://bad\nhost/".into(),
            kind: RedirectKind::Temporary,
        });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
