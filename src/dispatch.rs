//! Rewrite dispatcher
//!
//! Turns a request context into a redirect, an internal rewrite or a
//! passthrough. Route matchers overlap (an org-subdomain path can be both a
//! reserved page and a shortname), so they are evaluated as an explicit
//! priority list: the first rule that produces a decision wins.

use axum::http::StatusCode;

use crate::cleanup;
use crate::config::RouterConfig;
use crate::href::TenantOrigin;
use crate::request::{RequestContext, DEV_PARAM, SHORTNAME_PARAM};
use crate::reserved::{is_platform_prefix, is_tenant_slug, MANAGEMENT_PAGES, ROOT_ONLY_PAGES};
use crate::tenant::{classify, HostKind, RewriteTarget, Tenant};

/// Routing decision for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Visible redirect to another URL
    Redirect(RedirectTarget),
    /// Same-origin rewrite to an internal page
    Rewrite {
        /// Resolved tenant
        tenant: Tenant,
        /// Internal page serving it
        target: RewriteTarget,
    },
    /// Serve the request as-is
    Passthrough,
}

/// Redirect destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    /// Absolute URL sent as `Location`
    pub location: String,
    /// Status to answer with
    pub kind: RedirectKind,
}

/// Redirect status class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// 307
    Temporary,
    /// 308
    Permanent,
}

impl RedirectKind {
    /// HTTP status code
    pub fn status(self) -> StatusCode {
        match self {
            Self::Temporary => StatusCode::TEMPORARY_REDIRECT,
            Self::Permanent => StatusCode::PERMANENT_REDIRECT,
        }
    }
}

impl Dispatch {
    fn redirect(location: String, kind: RedirectKind) -> Self {
        Self::Redirect(RedirectTarget { location, kind })
    }
}

/// Dispatcher rules in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Framework, API and static files bypass tenant logic
    Platform,
    /// Legacy tenant signals redirect to the canonical URL
    Cleanup,
    /// Auth and legal pages live on the root origin only
    RootOnly,
    /// Management pages live on the principal's origin
    Management,
    /// Tenant classification and rewrite
    Tenant,
}

/// Evaluation order of [`Rule`]s
pub const PRIORITY: [Rule; 5] = [
    Rule::Platform,
    Rule::Cleanup,
    Rule::RootOnly,
    Rule::Management,
    Rule::Tenant,
];

impl Rule {
    /// Decision of this rule, or `None` to fall through
    pub fn apply(self, ctx: &RequestContext, config: &RouterConfig) -> Option<Dispatch> {
        match self {
            Self::Platform => is_platform_path(&ctx.pathname).then_some(Dispatch::Passthrough),
            Self::Cleanup => cleanup::normalize(ctx, config)
                .map(|location| Dispatch::redirect(location, RedirectKind::Temporary)),
            Self::RootOnly => root_only_redirect(ctx, config),
            Self::Management => management_route(ctx, config),
            Self::Tenant => {
                let tenant = classify(ctx, config);
                Some(match tenant.rewrite_target() {
                    Some(target) => Dispatch::Rewrite { tenant, target },
                    None => Dispatch::Passthrough,
                })
            }
        }
    }
}

/// Route a request
pub fn dispatch(ctx: &RequestContext, config: &RouterConfig) -> Dispatch {
    PRIORITY
        .iter()
        .find_map(|rule| rule.apply(ctx, config))
        .unwrap_or(Dispatch::Passthrough)
}

/// Framework/API prefix, or a last segment that looks like a file
pub fn is_platform_path(pathname: &str) -> bool {
    let mut segments = pathname.trim_start_matches('/').split('/');
    let first = segments.next().unwrap_or("");
    if is_platform_prefix(first) {
        return true;
    }
    let last = pathname.rsplit('/').next().unwrap_or("");
    last.contains('.')
}

fn first_segment(ctx: &RequestContext) -> Option<String> {
    ctx.segments().first().map(|s| s.to_ascii_lowercase())
}

fn root_only_redirect(ctx: &RequestContext, config: &RouterConfig) -> Option<Dispatch> {
    let first = first_segment(ctx)?;
    if !ROOT_ONLY_PAGES.contains(&first.as_str()) {
        return None;
    }
    if !HostKind::resolve(ctx, config).is_subdomain() {
        return None;
    }
    let location = TenantOrigin::for_context(ctx, config).url(None, &path_and_query_without_tenant(ctx));
    Some(Dispatch::redirect(location, RedirectKind::Temporary))
}

fn management_route(ctx: &RequestContext, config: &RouterConfig) -> Option<Dispatch> {
    let first = first_segment(ctx)?;
    if !MANAGEMENT_PAGES.contains(&first.as_str()) {
        return None;
    }
    let origin = TenantOrigin::for_context(ctx, config);
    if !ctx.is_authenticated() {
        return Some(Dispatch::redirect(
            origin.url(None, "/sign-in"),
            RedirectKind::Temporary,
        ));
    }

    // An org slug that cannot be a host label is managed from the root origin.
    let wanted = ctx
        .authenticated_org_slug()
        .map(str::to_ascii_lowercase)
        .filter(|slug| is_tenant_slug(slug));
    let host = HostKind::resolve(ctx, config);
    if host.org() == wanted.as_deref() && !matches!(host, HostKind::InvalidOrg) {
        return Some(Dispatch::Passthrough);
    }

    tracing::debug!(
        username = ctx.authenticated_username().unwrap_or_default(),
        org = ?wanted,
        path = %ctx.pathname,
        "management page on wrong origin"
    );
    Some(Dispatch::redirect(
        origin.url(wanted.as_deref(), &path_and_query_without_tenant(ctx)),
        RedirectKind::Permanent,
    ))
}

/// Path plus query with the tenant override parameters removed; the target
/// origin re-adds them where the mode needs them.
fn path_and_query_without_tenant(ctx: &RequestContext) -> String {
    let query = ctx.query.without(SHORTNAME_PARAM).without(DEV_PARAM);
    if query.is_empty() {
        ctx.pathname.clone()
    } else {
        format!("{}?{}", ctx.pathname, query.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::request::Principal;

    const ROOT: &str = "pr.djl.foundation";

    fn prod() -> RouterConfig {
        RouterConfig::default()
    }

    fn member(org: Option<&str>) -> Principal {
        Principal {
            username: "alice".into(),
            org_slug: org.map(str::to_string),
        }
    }

    fn redirect_to(dispatch: Dispatch) -> (String, RedirectKind) {
        match dispatch {
            Dispatch::Redirect(target) => (target.location, target.kind),
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(PRIORITY[0], Rule::Platform);
        assert_eq!(PRIORITY[PRIORITY.len() - 1], Rule::Tenant);
    }

    #[test]
    fn test_org_home_rewrite() {
        let ctx = RequestContext::new(Some("myorg.pr.djl.foundation"), "/", "");
        match dispatch(&ctx, &prod()) {
            Dispatch::Rewrite { tenant, target } => {
                assert_eq!(tenant, Tenant::OrgHome { org: "myorg".into() });
                assert_eq!(target.internal_path, "/org/myorg/home");
                assert!(target.trust_marker);
            }
            other => panic!("expected rewrite, got {other:?}"),
        }
    }

    #[test]
    fn test_free_tier_rewrite() {
        let ctx = RequestContext::new(Some(ROOT), "/alice/my-talk", "");
        match dispatch(&ctx, &prod()) {
            Dispatch::Rewrite { target, .. } => {
                assert_eq!(target.internal_path, "/view/free/alice/my-talk")
            }
            other => panic!("expected rewrite, got {other:?}"),
        }
    }

    #[test]
    fn test_manage_redirects_org_member() {
        let ctx = RequestContext::new(Some(ROOT), "/manage", "").with_principal(member(Some("acme")));
        let (location, kind) = redirect_to(dispatch(&ctx, &prod()));
        assert_eq!(location, "https://acme.pr.djl.foundation/manage");
        assert_eq!(kind, RedirectKind::Permanent);
        assert_eq!(kind.status(), StatusCode::PERMANENT_REDIRECT);
    }

    #[test]
    fn test_manage_on_correct_origin_passes() {
        let ctx = RequestContext::new(Some("acme.pr.djl.foundation"), "/manage", "")
            .with_principal(member(Some("acme")));
        assert_eq!(dispatch(&ctx, &prod()), Dispatch::Passthrough);

        let ctx = RequestContext::new(Some(ROOT), "/settings", "").with_principal(member(None));
        assert_eq!(dispatch(&ctx, &prod()), Dispatch::Passthrough);
    }

    #[test]
    fn test_manage_personal_user_leaves_org_host() {
        let ctx = RequestContext::new(Some("acme.pr.djl.foundation"), "/manage", "tab=billing")
            .with_principal(member(None));
        let (location, kind) = redirect_to(dispatch(&ctx, &prod()));
        assert_eq!(location, "https://pr.djl.foundation/manage?tab=billing");
        assert_eq!(kind, RedirectKind::Permanent);
    }

    /// Re-issue a redirect location as the next request of the same principal
    fn follow(location: &str, principal: &Principal) -> RequestContext {
        let url = url::Url::parse(location).unwrap();
        let host = match url.port() {
            Some(port) => format!("{}:{port}", url.host_str().unwrap()),
            None => url.host_str().unwrap().to_string(),
        };
        RequestContext::new(Some(&host), url.path(), url.query().unwrap_or(""))
            .with_principal(principal.clone())
    }

    #[test]
    fn test_manage_redirect_settles_for_mixed_case_org() {
        let principal = member(Some("Acme"));
        let ctx = RequestContext::new(Some(ROOT), "/manage", "").with_principal(principal.clone());
        let (location, _) = redirect_to(dispatch(&ctx, &prod()));
        assert_eq!(location, "https://acme.pr.djl.foundation/manage");
        assert_eq!(dispatch(&follow(&location, &principal), &prod()), Dispatch::Passthrough);
    }

    #[test]
    fn test_manage_with_unusable_org_slug_stays_on_root() {
        for slug in ["pricing", "acme corp", "www"] {
            let principal = member(Some(slug));
            let ctx = RequestContext::new(Some(ROOT), "/manage", "").with_principal(principal.clone());
            assert_eq!(dispatch(&ctx, &prod()), Dispatch::Passthrough, "org {slug}");

            let ctx = RequestContext::new(Some("pricing.pr.djl.foundation"), "/manage", "")
                .with_principal(principal.clone());
            let (location, _) = redirect_to(dispatch(&ctx, &prod()));
            assert_eq!(location, "https://pr.djl.foundation/manage");
            assert_eq!(dispatch(&follow(&location, &principal), &prod()), Dispatch::Passthrough);
        }
    }

    #[test]
    fn test_dev_manage_redirect_settles() {
        let config = RouterConfig {
            environment: Environment::Development,
            ..Default::default()
        };
        let principal = member(Some("ACME"));
        let ctx = RequestContext::new(Some("localhost:3000"), "/manage", "").with_principal(principal.clone());
        let (location, _) = redirect_to(dispatch(&ctx, &config));
        assert_eq!(location, "http://localhost:3000/manage?dev=true&shortname=acme");
        assert_eq!(dispatch(&follow(&location, &principal), &config), Dispatch::Passthrough);
    }

    #[test]
    fn test_manage_anonymous_signs_in() {
        let ctx = RequestContext::new(Some("acme.pr.djl.foundation"), "/manage", "");
        let (location, kind) = redirect_to(dispatch(&ctx, &prod()));
        assert_eq!(location, "https://pr.djl.foundation/sign-in");
        assert_eq!(kind, RedirectKind::Temporary);
    }

    #[test]
    fn test_root_only_pages_leave_org_host() {
        let ctx = RequestContext::new(Some("acme.pr.djl.foundation"), "/pricing", "");
        let (location, _) = redirect_to(dispatch(&ctx, &prod()));
        assert_eq!(location, "https://pr.djl.foundation/pricing");

        let ctx = RequestContext::new(Some(ROOT), "/pricing", "");
        assert_eq!(dispatch(&ctx, &prod()), Dispatch::Passthrough);
    }

    #[test]
    fn test_dev_mode_manage_redirect_uses_query_form() {
        let config = RouterConfig {
            environment: Environment::Development,
            ..Default::default()
        };
        let ctx = RequestContext::new(Some("localhost:3000"), "/manage", "")
            .with_principal(member(Some("acme")));
        let (location, _) = redirect_to(dispatch(&ctx, &config));
        assert_eq!(location, "http://localhost:3000/manage?dev=true&shortname=acme");

        let ctx = RequestContext::new(Some("localhost:3000"), "/manage", "dev=true&shortname=acme")
            .with_principal(member(Some("acme")));
        assert_eq!(dispatch(&ctx, &config), Dispatch::Passthrough);
    }

    #[test]
    fn test_platform_paths_bypass_everything() {
        let ctx = RequestContext::new(Some("acme.pr.djl.foundation"), "/api/href/home", "shortname=x");
        assert_eq!(dispatch(&ctx, &prod()), Dispatch::Passthrough);
        assert!(is_platform_path("/favicon.ico"));
        assert!(is_platform_path("/_next/static/chunk.js"));
        assert!(!is_platform_path("/alice/talk"));
    }

    #[test]
    fn test_cleanup_precedes_tenant() {
        let ctx = RequestContext::new(Some(ROOT), "/", "shortname=acme");
        let (location, kind) = redirect_to(dispatch(&ctx, &prod()));
        assert_eq!(location, "https://acme.pr.djl.foundation/");
        assert_eq!(kind, RedirectKind::Temporary);
    }

    #[test]
    fn test_reserved_org_subdomain_forbidden() {
        let ctx = RequestContext::new(Some("settings.pr.djl.foundation"), "/", "");
        match dispatch(&ctx, &prod()) {
            Dispatch::Rewrite { tenant, target } => {
                assert_eq!(tenant, Tenant::Forbidden);
                assert_eq!(target.internal_path, "/forbidden");
            }
            other => panic!("expected forbidden rewrite, got {other:?}"),
        }
    }
}
