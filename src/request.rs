//! Request analysis
//!
//! Extracts the host, pathname and query-string signals of an inbound request.

use axum::http::{header, HeaderMap, Uri};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Query flag enabling the development tenant override
pub const DEV_PARAM: &str = "dev";
/// Query parameter carrying the development tenant override
pub const SHORTNAME_PARAM: &str = "shortname";

/// Ordered query-string pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    /// Parse a raw (undecoded) query string
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// Params from decoded pairs, order kept
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// First value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True if the key occurs at all
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// True if there are no pairs
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Decoded pairs in request order
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Copy with every pair for `key` removed
    pub fn without(&self, key: &str) -> Self {
        Self {
            pairs: self.pairs.iter().filter(|(k, _)| k != key).cloned().collect(),
        }
    }

    /// Keep `key` only where `keep` accepts its value
    pub fn retain_key<F>(&self, key: &str, keep: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        Self {
            pairs: self
                .pairs
                .iter()
                .filter(|(k, v)| k != key || keep(v))
                .cloned()
                .collect(),
        }
    }

    /// Serialize to an `application/x-www-form-urlencoded` string
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// `?query` or an empty string
    pub fn to_query_suffix(&self) -> String {
        if self.pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", self.encode())
        }
    }
}

/// Authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Username of the session
    pub username: String,
    /// Organization the principal acts for, if any
    pub org_slug: Option<String>,
}

/// Host and query signals relevant to tenant resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantSignals {
    /// Normalized host: lowercase, no port
    pub host: Option<String>,
    /// `dev=true` was passed
    pub dev_flag: bool,
    /// `shortname` override
    pub shortname: Option<String>,
}

impl TenantSignals {
    /// Signals from bare search params (no host available)
    pub fn from_search_params(params: &SearchParams) -> Self {
        Self {
            host: None,
            dev_flag: params.get(DEV_PARAM) == Some("true"),
            shortname: params
                .get(SHORTNAME_PARAM)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// Per-request routing context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Host as sent by the client (port included)
    pub host: Option<String>,
    /// Path, `/` when empty
    pub pathname: String,
    /// Decoded query
    pub query: SearchParams,
    /// Session principal, `None` when anonymous
    pub principal: Option<Principal>,
}

impl RequestContext {
    /// Context from a raw host, path and query string
    pub fn new(host: Option<&str>, pathname: &str, query: &str) -> Self {
        Self {
            host: host.map(str::to_string),
            pathname: if pathname.is_empty() { "/".into() } else { pathname.into() },
            query: SearchParams::parse(query),
            principal: None,
        }
    }

    /// Build from a framework request's headers and URI
    pub fn from_http(headers: &HeaderMap, uri: &Uri, principal: Option<Principal>) -> Self {
        let host = request_host(headers, uri);
        let mut ctx = Self::new(host.as_deref(), uri.path(), uri.query().unwrap_or(""));
        ctx.principal = principal;
        ctx
    }

    /// Attach a session principal
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// True with a session principal
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Username of the session principal
    pub fn authenticated_username(&self) -> Option<&str> {
        self.principal.as_ref().map(|p| p.username.as_str())
    }

    /// Active org of the session principal
    pub fn authenticated_org_slug(&self) -> Option<&str> {
        self.principal.as_ref().and_then(|p| p.org_slug.as_deref())
    }

    /// Tenant signals of this context
    pub fn signals(&self) -> TenantSignals {
        let mut signals = TenantSignals::from_search_params(&self.query);
        signals.host = self.host.as_deref().map(normalize_host);
        signals
    }

    /// Path segments; `/a//b` yields an empty middle segment
    pub fn segments(&self) -> Vec<&str> {
        path_segments(&self.pathname)
    }
}

/// Split a pathname into segments; `/` yields none
pub fn path_segments(pathname: &str) -> Vec<&str> {
    let trimmed = pathname.strip_prefix('/').unwrap_or(pathname);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// Lowercase and strip the port
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().to_ascii_lowercase();
    let host = match host.rsplit_once(':') {
        Some((name, port)) if !name.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            name.to_string()
        }
        _ => host,
    };
    host.trim_end_matches('.').to_string()
}

/// Host header, then URI authority, then the Referer's host.
/// A malformed Referer is ignored.
fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    if let Some(host) = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.trim().is_empty())
    {
        return Some(host.trim().to_string());
    }
    if let Some(authority) = uri.authority() {
        return Some(authority.as_str().to_string());
    }
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    match url::Url::parse(referer) {
        Ok(parsed) => parsed.host_str().map(|h| match parsed.port() {
            Some(port) => format!("{h}:{port}"),
            None => h.to_string(),
        }),
        Err(e) => {
            tracing::debug!(referer, error = %e, "ignoring malformed referer");
            None
        }
    }
}
