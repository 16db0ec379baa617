//! Reserved names
//!
//! Names that can never be interpreted as a username, org slug or shortname.

/// Product pages and internal rewrite targets
pub const RESERVED_NAMES: &[&str] = &[
    "sign-in",
    "sign-up",
    "pricing",
    "waitlist",
    "profile",
    "terms",
    "privacy",
    "manage",
    "edit",
    "create",
    "org",
    "settings",
    "select",
    "hero",
    "home",
    "view",
    "layout",
    "forbidden",
];

/// Framework, API and static prefixes. These bypass tenant resolution entirely.
pub const PLATFORM_PREFIXES: &[&str] = &[
    "_next",
    "_vercel",
    "static",
    "assets",
    "api",
    "trpc",
    "monitoring",
];

/// Hostname labels that alias the root domain and never name an org
const ROOT_LABELS: &[&str] = &["www"];

/// Root-domain pages that only exist on the root origin
pub const ROOT_ONLY_PAGES: &[&str] = &["sign-in", "sign-up", "pricing", "waitlist", "terms", "privacy"];

/// Auth-gated management pages
pub const MANAGEMENT_PAGES: &[&str] = &["manage", "settings"];

/// Check whether a name is reserved (case-insensitive)
pub fn is_reserved(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    RESERVED_NAMES.contains(&name.as_str())
        || PLATFORM_PREFIXES.contains(&name.as_str())
        || ROOT_LABELS.contains(&name.as_str())
}

/// Check whether a hostname label is an alias of the root domain
pub fn is_root_label(label: &str) -> bool {
    ROOT_LABELS.contains(&label.to_ascii_lowercase().as_str())
}

/// Check whether a segment is a framework/API prefix
pub fn is_platform_prefix(segment: &str) -> bool {
    PLATFORM_PREFIXES.contains(&segment.to_ascii_lowercase().as_str())
}

/// Slugs are non-empty ASCII alphanumerics plus `-` and `_`
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// A slug usable as a tenant name: valid and not reserved
pub fn is_tenant_slug(slug: &str) -> bool {
    is_valid_slug(slug) && !is_reserved(slug)
}
