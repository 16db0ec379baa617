//! Href builders
//!
//! Outward-facing URLs for a tenant. In development the tenant rides in the
//! query string of the current origin (`?dev=true&shortname=…`); in
//! production it is a subdomain of the root domain.

use crate::config::{Environment, RouterConfig};
use crate::error::RouterError;
use crate::request::{RequestContext, SearchParams, DEV_PARAM, SHORTNAME_PARAM};
use crate::reserved::is_tenant_slug;
use crate::tenant::is_under_root;

/// How tenant links are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrefMode {
    /// Same origin, `?dev=true&shortname=…`
    Query,
    /// `https://{tenant}.{root}/`
    Subdomain,
}

impl HrefMode {
    /// Name reported by the href API
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Subdomain => "subdomain",
        }
    }
}

/// Development-mode detection
pub struct DevMode;

impl DevMode {
    /// Pure function of environment, `dev` flag and host. A host outside the
    /// root domain (localhost, previews) cannot carry tenant subdomains, so it
    /// implies dev mode in development.
    pub fn detect(environment: Environment, dev_flag: bool, host: Option<&str>, root_domain: &str) -> bool {
        if !environment.is_development() {
            return false;
        }
        dev_flag || host.map_or(false, |h| !is_under_root(h, root_domain))
    }

    /// Dev mode for a request context
    pub fn for_context(ctx: &RequestContext, config: &RouterConfig) -> bool {
        let signals = ctx.signals();
        Self::detect(
            config.environment,
            signals.dev_flag,
            signals.host.as_deref(),
            &config.root_domain,
        )
    }
}

/// Origin builder for a request
#[derive(Debug, Clone)]
pub struct TenantOrigin<'a> {
    config: &'a RouterConfig,
    mode: HrefMode,
    /// Raw request host, port included
    host: Option<&'a str>,
}

impl<'a> TenantOrigin<'a> {
    /// Origin for the mode of the current request
    pub fn for_context(ctx: &'a RequestContext, config: &'a RouterConfig) -> Self {
        let mode = if DevMode::for_context(ctx, config) {
            HrefMode::Query
        } else {
            HrefMode::Subdomain
        };
        Self {
            config,
            mode,
            host: ctx.host.as_deref(),
        }
    }

    /// Link mode in use
    pub fn mode(&self) -> HrefMode {
        self.mode
    }

    /// URL of `path` (which may carry a query) on the tenant's origin;
    /// `None` is the root tenant
    pub fn url(&self, tenant: Option<&str>, path: &str) -> String {
        let scheme = self.config.environment.scheme();
        let (path, extra) = match path.split_once('?') {
            Some((path, query)) => (path, SearchParams::parse(query)),
            None => (path, SearchParams::default()),
        };
        let path = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };
        match self.mode {
            HrefMode::Query => {
                let host = self.host.unwrap_or(self.config.root_domain.as_str());
                let mut pairs = vec![(DEV_PARAM, "true")];
                if let Some(tenant) = tenant {
                    pairs.push((SHORTNAME_PARAM, tenant));
                }
                let extra_pairs = extra.pairs().iter().map(|(k, v)| (k.as_str(), v.as_str()));
                let query = SearchParams::from_pairs(pairs.into_iter().chain(extra_pairs));
                format!("{scheme}://{host}{path}{}", query.to_query_suffix())
            }
            HrefMode::Subdomain => {
                let host = match tenant {
                    Some(tenant) => format!("{tenant}.{}", self.config.root_domain),
                    None => self.config.root_domain.clone(),
                };
                format!("{scheme}://{host}{path}{}", extra.to_query_suffix())
            }
        }
    }
}

/// Link to a presentation by shortname. Reserved names are rejected since
/// their host never resolves to a tenant.
pub fn view_href(ctx: &RequestContext, config: &RouterConfig, shortname: &str) -> Result<String, RouterError> {
    let slug = shortname.to_ascii_lowercase();
    if !is_tenant_slug(&slug) {
        return Err(RouterError::InvalidShortname(shortname.to_string()));
    }
    Ok(TenantOrigin::for_context(ctx, config).url(Some(&slug), "/"))
}

/// Link to the root home page
pub fn home_href(ctx: &RequestContext, config: &RouterConfig) -> String {
    TenantOrigin::for_context(ctx, config).url(None, "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(environment: Environment) -> RouterConfig {
        RouterConfig {
            environment,
            ..Default::default()
        }
    }

    #[test]
    fn test_dev_view_href_is_same_origin() {
        let config = config(Environment::Development);
        let ctx = RequestContext::new(Some("pr.djl.foundation"), "/", "dev=true");
        let href = view_href(&ctx, &config, "abc").unwrap();
        assert_eq!(href, "http://pr.djl.foundation/?dev=true&shortname=abc");
        assert!(href.contains("shortname=abc"));
    }

    #[test]
    fn test_production_view_href_is_subdomain() {
        let config = config(Environment::Production);
        let ctx = RequestContext::new(Some("pr.djl.foundation"), "/", "dev=true");
        assert_eq!(view_href(&ctx, &config, "abc").unwrap(), "https://abc.pr.djl.foundation/");
    }

    #[test]
    fn test_localhost_implies_dev_mode_in_development() {
        let config = config(Environment::Development);
        let ctx = RequestContext::new(Some("localhost:3000"), "/", "");
        assert_eq!(
            view_href(&ctx, &config, "abc").unwrap(),
            "http://localhost:3000/?dev=true&shortname=abc"
        );
        assert_eq!(home_href(&ctx, &config), "http://localhost:3000/?dev=true");
    }

    #[test]
    fn test_home_href_production() {
        let config = config(Environment::Production);
        let ctx = RequestContext::new(Some("acme.pr.djl.foundation"), "/talk", "");
        assert_eq!(home_href(&ctx, &config), "https://pr.djl.foundation/");
    }

    #[test]
    fn test_dev_mode_decision() {
        let root = "pr.djl.foundation";
        assert!(!DevMode::detect(Environment::Production, true, Some("localhost"), root));
        assert!(DevMode::detect(Environment::Development, true, Some(root), root));
        assert!(!DevMode::detect(Environment::Development, false, Some(root), root));
        assert!(!DevMode::detect(Environment::Development, false, None, root));
        assert!(DevMode::detect(Environment::Development, false, Some("localhost"), root));
    }

    #[test]
    fn test_invalid_shortname_rejected() {
        let config = config(Environment::Production);
        let ctx = RequestContext::new(None, "/", "");
        assert!(matches!(
            view_href(&ctx, &config, "not valid"),
            Err(RouterError::InvalidShortname(_))
        ));
    }

    #[test]
    fn test_reserved_shortname_rejected() {
        let config = config(Environment::Production);
        let ctx = RequestContext::new(Some("pr.djl.foundation"), "/", "");
        for reserved in ["pricing", "Settings", "www", "api"] {
            assert!(matches!(
                view_href(&ctx, &config, reserved),
                Err(RouterError::InvalidShortname(_))
            ));
        }
    }

    #[test]
    fn test_view_href_is_lowercased() {
        let ctx = RequestContext::new(Some("pr.djl.foundation"), "/", "");
        assert_eq!(
            view_href(&ctx, &config(Environment::Production), "ABC").unwrap(),
            "https://abc.pr.djl.foundation/"
        );
    }
}
