//! JSON API: href builders and resolution report

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, Uri},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use utoipa::OpenApi;

use crate::error::RouterError;
use crate::href::{home_href, view_href, TenantOrigin};
use crate::models::{ApiResult, ErrorResponse, HrefResponse, ResolveResponse};
use crate::request::{Principal, RequestContext};
use crate::tenant::classify;
use crate::{ApiDoc, AppState};

/// `/api` routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(super::health::health_check))
        .route("/href/view", get(get_view_href))
        .route("/href/home", get(get_home_href))
        .route("/resolve", get(resolve))
        .route("/openapi.json", get(openapi))
}

/// Query of `/api/href/view`
#[derive(Debug, Deserialize)]
pub struct ViewHrefParams {
    shortname: Option<String>,
}

/// Query of `/api/resolve`
#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    path: Option<String>,
}

fn request_context(headers: &HeaderMap, uri: &Uri, principal: Option<Extension<Principal>>) -> RequestContext {
    RequestContext::from_http(headers, uri, principal.map(|Extension(p)| p))
}

/// Link to a presentation
#[utoipa::path(
    get,
    path = "/api/href/view",
    params(
        ("shortname" = String, Query, description = "Presentation shortname"),
        ("dev" = Option<String>, Query, description = "`true` enables development links")
    ),
    responses(
        (status = 200, description = "Outward URL of the presentation", body = HrefResponse),
        (status = 400, description = "Missing or invalid shortname", body = ErrorResponse)
    ),
    tag = "href"
)]
pub async fn get_view_href(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ViewHrefParams>,
    headers: HeaderMap,
    uri: Uri,
    principal: Option<Extension<Principal>>,
) -> Result<Json<ApiResult<HrefResponse>>, RouterError> {
    let shortname = params.shortname.unwrap_or_default();
    let ctx = request_context(&headers, &uri, principal);
    let href = view_href(&ctx, &state.config, &shortname)?;
    let mode = TenantOrigin::for_context(&ctx, &state.config).mode();
    Ok(Json(ApiResult::ok(HrefResponse {
        href,
        mode: mode.as_str().into(),
    })))
}

/// Link to the root home page
#[utoipa::path(
    get,
    path = "/api/href/home",
    params(("dev" = Option<String>, Query, description = "`true` enables development links")),
    responses((status = 200, description = "Outward URL of the home page", body = HrefResponse)),
    tag = "href"
)]
pub async fn get_home_href(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    principal: Option<Extension<Principal>>,
) -> Json<ApiResult<HrefResponse>> {
    let ctx = request_context(&headers, &uri, principal);
    let mode = TenantOrigin::for_context(&ctx, &state.config).mode();
    Json(ApiResult::ok(HrefResponse {
        href: home_href(&ctx, &state.config),
        mode: mode.as_str().into(),
    }))
}

/// Classify a page path as seen from the caller's host
#[utoipa::path(
    get,
    path = "/api/resolve",
    params(("path" = Option<String>, Query, description = "Page path, defaults to `/`")),
    responses((status = 200, description = "Tenant classification", body = ResolveResponse)),
    tag = "href"
)]
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveParams>,
    headers: HeaderMap,
    uri: Uri,
    principal: Option<Extension<Principal>>,
) -> Json<ApiResult<ResolveResponse>> {
    let mut ctx = request_context(&headers, &uri, principal);
    ctx.pathname = params
        .path
        .filter(|p| p.starts_with('/'))
        .unwrap_or_else(|| "/".into());

    let tenant = classify(&ctx, &state.config);
    Json(ApiResult::ok(ResolveResponse {
        host: ctx.host.clone(),
        pathname: ctx.pathname.clone(),
        tenant: tenant.kind().into(),
        internal_path: tenant.rewrite_target().map(|t| t.internal_path),
        authenticated: ctx.is_authenticated(),
    }))
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
