//! Redirect normalizer
//!
//! Detects URLs that still carry legacy tenant signals and computes their
//! canonical form. The canonical URL is a fixed point: normalizing it again
//! yields nothing.

use crate::config::RouterConfig;
use crate::href::DevMode;
use crate::request::{RequestContext, SearchParams, DEV_PARAM, SHORTNAME_PARAM};
use crate::reserved::is_tenant_slug;
use crate::tenant::subdomain_label;

/// Canonical location of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrl {
    /// `http` or `https`
    pub scheme: &'static str,
    /// Host, port included
    pub host: String,
    /// Unchanged request path
    pub path: String,
    /// Query without legacy tenant parameters
    pub query: SearchParams,
}

impl std::fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}://{}{}{}",
            self.scheme,
            self.host,
            self.path,
            self.query.to_query_suffix()
        )
    }
}

/// Canonical form of the request URL
pub fn canonicalize(ctx: &RequestContext, config: &RouterConfig) -> CanonicalUrl {
    let signals = ctx.signals();
    let current_host = ctx.host.clone().unwrap_or_else(|| config.root_domain.clone());
    let on_subdomain = signals
        .host
        .as_deref()
        .and_then(|h| subdomain_label(h, &config.root_domain))
        .is_some();
    let keep_dev = |value: &str| value == "true";

    let (host, query) = if on_subdomain {
        // The host already names the tenant.
        (
            current_host,
            ctx.query.without(SHORTNAME_PARAM).retain_key(DEV_PARAM, keep_dev),
        )
    } else if DevMode::for_context(ctx, config) {
        // Query-string tenant form is canonical in dev mode.
        (current_host, ctx.query.retain_key(DEV_PARAM, keep_dev))
    } else {
        let promoted = signals
            .shortname
            .map(|s| s.to_ascii_lowercase())
            .filter(|s| is_tenant_slug(s));
        let host = match promoted {
            Some(slug) => format!("{slug}.{}", config.root_domain),
            None => current_host,
        };
        (
            host,
            ctx.query.without(SHORTNAME_PARAM).retain_key(DEV_PARAM, keep_dev),
        )
    };

    CanonicalUrl {
        scheme: config.environment.scheme(),
        host,
        path: ctx.pathname.clone(),
        query,
    }
}

/// Canonical URL to redirect to, or `None` when the request is already canonical
pub fn normalize(ctx: &RequestContext, config: &RouterConfig) -> Option<String> {
    let canonical = canonicalize(ctx, config);
    let current_host = ctx.host.as_deref().unwrap_or(&config.root_domain);
    if canonical.host == current_host && canonical.query == ctx.query {
        return None;
    }
    Some(canonical.to_string())
}
