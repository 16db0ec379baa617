//! Presentation Foundation Router
//!
//! Tenant and shortname resolution for a multi-tenant presentation host.
//! Every request is classified from its host, path, query and session, then
//! redirected, rewritten to an internal page, or passed through.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     request (Host, path, query)                   │
//! └───────────────────────────────┬───────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────▼───────────────────────────────────┐
//! │  request_log  →  tenant_routing                                   │
//! │                                                                   │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌────────────┐  ┌────┐ │
//! │  │ Platform │→ │ Cleanup  │→ │ RootOnly │→ │ Management │→ │ Tn │ │
//! │  └──────────┘  └──────────┘  └──────────┘  └────────────┘  └────┘ │
//! │        first rule with a decision wins: redirect / rewrite        │
//! └───────────────────────────────┬───────────────────────────────────┘
//!                                 │ rewritten URI + trust marker
//! ┌───────────────────────────────▼───────────────────────────────────┐
//! │  pages (guarded)  │  public pages  │  /api  │  not found          │
//! └───────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod cleanup;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod href;
pub mod middleware;
pub mod models;
pub mod request;
pub mod reserved;
pub mod routes;
pub mod tenant;

use std::sync::Arc;

use axum::{
    http::HeaderName,
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

pub use config::{Environment, RouterConfig};
pub use dispatch::{dispatch, Dispatch};
pub use error::RouterError;
pub use models::*;
pub use request::{Principal, RequestContext};
pub use tenant::{classify, Tenant};

use middleware::auth::SessionVerifier;
use routes::{api, pages};

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    /// Validated configuration
    pub config: RouterConfig,
    /// Session token verifier
    pub sessions: SessionVerifier,
    /// Trust-marker header name
    pub trust_header: HeaderName,
}

impl AppState {
    /// Validate the configuration and build the state
    pub fn new(config: RouterConfig) -> Result<Self, RouterError> {
        config.validate()?;
        let trust_header = HeaderName::from_bytes(config.trust_header.as_bytes()).map_err(|e| {
            config::ConfigError::Invalid(format!("trust_header {}: {e}", config.trust_header))
        })?;
        Ok(Self {
            sessions: SessionVerifier::new(&config.session),
            trust_header,
            config,
        })
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presentation Foundation Router",
        description = "Tenant resolution and outward link building"
    ),
    paths(
        routes::health::health_check,
        routes::api::get_view_href,
        routes::api::get_home_href,
        routes::api::resolve,
    ),
    components(
        schemas(
            ErrorResponse, HrefResponse, ResolveResponse, PageView,
            routes::health::HealthResponse
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "href", description = "Tenant-aware link building")
    )
)]
pub struct ApiDoc;

/// Build the page and API router, without tenant routing
pub fn build_router(state: Arc<AppState>) -> Router {
    let internal = pages::internal_router()
        .route_layer(from_fn_with_state(state.clone(), middleware::guard::require_trust_marker));

    Router::new()
        .merge(internal)
        .merge(pages::public_router())
        .nest("/api", api::router().layer(CorsLayer::permissive()))
        .fallback(pages::not_found)
        .with_state(state)
}

/// Build the full application
///
/// Tenant routing wraps the page router so a rewritten URI is routed
/// against the internal pages.
pub fn build_app(state: AppState) -> Router {
    let state = Arc::new(state);
    Router::new()
        .fallback_service(build_router(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(middleware::logging::request_log))
                .layer(from_fn_with_state(state, middleware::tenant::tenant_routing)),
        )
}

/// Serve until ctrl-c
pub async fn serve(state: AppState) -> Result<(), RouterError> {
    let addr = state.config.listen_addr.clone();
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
