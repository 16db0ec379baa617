//! Tenant resolution
//!
//! Classifies every request into exactly one [`Tenant`]. The decision table is
//! total: unresolvable input lands in [`Tenant::Forbidden`] or
//! [`Tenant::Passthrough`], never nowhere.
//!
//! ```text
//! host                    path              tenant
//! ─────────────────────── ───────────────── ──────────────────────────────
//! {root}                  /                 RootHero | RootHomeUser (auth)
//! {root}                  /{reserved}/…     Passthrough
//! {root}                  /!{shortname}     ProTierView
//! {root}                  /{user}           UserProfile
//! {root}                  /{user}/{short}   FreeTierView
//! {org}.{root}            /                 OrgHome
//! {org}.{root}            /profile          OrgProfile
//! {org}.{root}            /{shortname}      OrgView
//! {reserved}.{root}       *                 Forbidden
//! ```

use serde::Serialize;

use crate::config::RouterConfig;
use crate::href::DevMode;
use crate::request::RequestContext;
use crate::reserved::{is_reserved, is_root_label, is_tenant_slug, is_valid_slug};

/// Prefix marking a pro-tier shortname on the root domain, e.g. `/!keynote`
pub const PRO_TIER_PREFIX: char = '!';

/// Tenant classification of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tenant {
    /// Marketing page for anonymous visitors
    RootHero,
    /// Signed-in dashboard on the root domain
    RootHomeUser,
    /// Public profile of a user, `/{username}`
    UserProfile {
        /// Profile owner
        username: String,
    },
    /// Free-tier presentation, `/{username}/{shortname}`
    FreeTierView {
        /// Presentation owner
        username: String,
        /// Presentation shortname
        shortname: String,
    },
    /// Pro-tier presentation, `/!{shortname}`
    ProTierView {
        /// Presentation shortname
        shortname: String,
    },
    /// Landing page of an org subdomain
    OrgHome {
        /// Org slug
        org: String,
    },
    /// Profile page of an org subdomain
    OrgProfile {
        /// Org slug
        org: String,
    },
    /// Presentation on an org subdomain, `/{shortname}`
    OrgView {
        /// Org slug
        org: String,
        /// Presentation shortname
        shortname: String,
    },
    /// Reserved or malformed name
    Forbidden,
    /// Normal page routing, no tenant interpretation
    Passthrough,
}

impl Tenant {
    /// Snake-case variant name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RootHero => "root_hero",
            Self::RootHomeUser => "root_home_user",
            Self::UserProfile { .. } => "user_profile",
            Self::FreeTierView { .. } => "free_tier_view",
            Self::ProTierView { .. } => "pro_tier_view",
            Self::OrgHome { .. } => "org_home",
            Self::OrgProfile { .. } => "org_profile",
            Self::OrgView { .. } => "org_view",
            Self::Forbidden => "forbidden",
            Self::Passthrough => "passthrough",
        }
    }

    /// Internal page serving this tenant; `None` for passthrough
    pub fn rewrite_target(&self) -> Option<RewriteTarget> {
        let path = match self {
            Self::RootHero => "/hero".to_string(),
            Self::RootHomeUser => "/home".to_string(),
            Self::UserProfile { username } => format!("/profile/{username}"),
            Self::FreeTierView { username, shortname } => format!("/view/free/{username}/{shortname}"),
            Self::ProTierView { shortname } => format!("/view/pro/{shortname}"),
            Self::OrgHome { org } => format!("/org/{org}/home"),
            Self::OrgProfile { org } => format!("/org/{org}/profile"),
            Self::OrgView { org, shortname } => format!("/org/{org}/view/{shortname}"),
            Self::Forbidden => "/forbidden".to_string(),
            Self::Passthrough => return None,
        };
        Some(RewriteTarget::trusted(path))
    }
}

/// Internal rewrite destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteTarget {
    /// Path of the internal page
    pub internal_path: String,
    /// Set only by the dispatcher; checked by the page guard
    pub trust_marker: bool,
}

impl RewriteTarget {
    /// Target carrying the trust marker
    pub fn trusted(internal_path: impl Into<String>) -> Self {
        Self {
            internal_path: internal_path.into(),
            trust_marker: true,
        }
    }
}

/// Which side of the root domain a request is on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKind {
    /// Root domain, `www`, foreign hosts and missing host
    Root,
    /// Org subdomain (or dev-mode `shortname` override)
    Org(String),
    /// Subdomain whose label can never be an org
    InvalidOrg,
}

impl HostKind {
    /// Resolve the host side of a request, dev override included
    pub fn resolve(ctx: &RequestContext, config: &RouterConfig) -> Self {
        let signals = ctx.signals();
        let host = signals.host.as_deref();

        if let Some(label) = host.and_then(|h| subdomain_label(h, &config.root_domain)) {
            return Self::from_label(label);
        }

        if DevMode::for_context(ctx, config) {
            if let Some(slug) = signals.shortname.as_deref() {
                return Self::from_label(slug);
            }
        }

        Self::Root
    }

    fn from_label(label: &str) -> Self {
        let label = label.to_ascii_lowercase();
        if is_root_label(&label) {
            Self::Root
        } else if is_tenant_slug(&label) {
            Self::Org(label)
        } else {
            Self::InvalidOrg
        }
    }

    /// Org slug when on an org host
    pub fn org(&self) -> Option<&str> {
        match self {
            Self::Org(slug) => Some(slug),
            _ => None,
        }
    }

    /// True for the subdomain variants
    pub fn is_subdomain(&self) -> bool {
        !matches!(self, Self::Root)
    }
}

/// `host` is the root domain or one of its subdomains
pub fn is_under_root(host: &str, root_domain: &str) -> bool {
    host == root_domain || host.ends_with(&format!(".{root_domain}"))
}

/// First label of a strict subdomain of `root_domain`
pub fn subdomain_label<'a>(host: &'a str, root_domain: &str) -> Option<&'a str> {
    let prefix = host.strip_suffix(root_domain)?.strip_suffix('.')?;
    if prefix.is_empty() {
        return None;
    }
    prefix.split('.').next()
}

/// Classify a request
pub fn classify(ctx: &RequestContext, config: &RouterConfig) -> Tenant {
    match HostKind::resolve(ctx, config) {
        HostKind::Root => classify_root(ctx),
        HostKind::Org(org) => classify_org(ctx, org),
        HostKind::InvalidOrg => Tenant::Forbidden,
    }
}

fn classify_root(ctx: &RequestContext) -> Tenant {
    let segments = ctx.segments();

    let Some(first) = segments.first() else {
        return if ctx.is_authenticated() {
            Tenant::RootHomeUser
        } else {
            Tenant::RootHero
        };
    };

    // Reserved names always win over tenant interpretation.
    if is_reserved(first) {
        return Tenant::Passthrough;
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Tenant::Forbidden;
    }

    match segments.as_slice() {
        [single] => match single.strip_prefix(PRO_TIER_PREFIX) {
            Some(shortname) if is_valid_slug(shortname) => Tenant::ProTierView {
                shortname: shortname.to_string(),
            },
            Some(_) => Tenant::Forbidden,
            None if is_valid_slug(single) => Tenant::UserProfile {
                username: single.to_string(),
            },
            None => Tenant::Forbidden,
        },
        [username, shortname] => {
            if is_valid_slug(username) && is_tenant_slug(shortname) {
                Tenant::FreeTierView {
                    username: username.to_string(),
                    shortname: shortname.to_string(),
                }
            } else {
                Tenant::Forbidden
            }
        }
        _ => Tenant::Passthrough,
    }
}

fn classify_org(ctx: &RequestContext, org: String) -> Tenant {
    let segments = ctx.segments();
    match segments.as_slice() {
        [] => Tenant::OrgHome { org },
        // Explicit entry ahead of the reserved-name rule.
        ["profile"] => Tenant::OrgProfile { org },
        [single] if is_tenant_slug(single) => Tenant::OrgView {
            org,
            shortname: single.to_string(),
        },
        _ => Tenant::Forbidden,
    }
}
