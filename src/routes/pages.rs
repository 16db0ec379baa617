//! Page endpoints
//!
//! Internal pages are the rewrite targets of the tenant middleware and are
//! only served behind the trust-marker guard. Public pages are reached
//! directly on the root domain.

use std::sync::Arc;

use axum::{
    extract::Path,
    http::Uri,
    routing::get,
    Extension, Json, Router,
};

use crate::error::RouterError;
use crate::models::{ApiResult, PageView};
use crate::request::{path_segments, Principal};
use crate::AppState;

/// Pages served as-is on the root domain
pub const PUBLIC_PAGES: &[&str] = &[
    "sign-in", "sign-up", "pricing", "waitlist", "terms", "privacy", "create", "select", "manage",
    "settings",
];

type PageResult = Json<ApiResult<PageView>>;

/// Internal rewrite targets
pub fn internal_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/hero", get(hero))
        .route("/home", get(home))
        .route("/profile/:username", get(user_profile))
        .route("/view/free/:username/:shortname", get(free_tier_view))
        .route("/view/pro/:shortname", get(pro_tier_view))
        .route("/org/:org/home", get(org_home))
        .route("/org/:org/profile", get(org_profile))
        .route("/org/:org/view/:shortname", get(org_view))
        .route("/forbidden", get(forbidden))
}

/// Public pages, including their sub-pages
pub fn public_router() -> Router<Arc<AppState>> {
    PUBLIC_PAGES.iter().fold(Router::new(), |router, page| {
        router
            .route(&format!("/{page}"), get(public_page))
            .route(&format!("/{page}/*rest"), get(public_page))
    })
}

fn page(view: PageView) -> PageResult {
    Json(ApiResult::ok(view))
}

async fn hero() -> PageResult {
    page(PageView::new("hero"))
}

async fn home(principal: Option<Extension<Principal>>) -> Result<PageResult, RouterError> {
    let Some(Extension(principal)) = principal else {
        return Err(RouterError::Forbidden("home requires a session".into()));
    };
    Ok(page(PageView::new("home").username(principal.username)))
}

async fn user_profile(Path(username): Path<String>) -> PageResult {
    page(PageView::new("user_profile").username(username))
}

async fn free_tier_view(Path((username, shortname)): Path<(String, String)>) -> PageResult {
    page(
        PageView::new("free_tier_view")
            .username(username)
            .shortname(shortname),
    )
}

async fn pro_tier_view(Path(shortname): Path<String>) -> PageResult {
    page(PageView::new("pro_tier_view").shortname(shortname))
}

async fn org_home(Path(org): Path<String>) -> PageResult {
    page(PageView::new("org_home").org(org))
}

async fn org_profile(Path(org): Path<String>) -> PageResult {
    page(PageView::new("org_profile").org(org))
}

async fn org_view(Path((org, shortname)): Path<(String, String)>) -> PageResult {
    page(PageView::new("org_view").org(org).shortname(shortname))
}

async fn forbidden() -> RouterError {
    RouterError::Forbidden("this name is reserved".into())
}

async fn public_page(uri: Uri, principal: Option<Extension<Principal>>) -> PageResult {
    let name = path_segments(uri.path()).first().copied().unwrap_or("").to_string();
    let mut view = PageView::new(&name);
    if let Some(Extension(principal)) = principal {
        if let Some(org) = principal.org_slug {
            view = view.org(org);
        }
        view = view.username(principal.username);
    }
    page(view)
}

/// Fallback for unknown paths
pub async fn not_found(uri: Uri) -> RouterError {
    RouterError::NotFound(uri.path().to_string())
}
