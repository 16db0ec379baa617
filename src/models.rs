//! API Models
//!
//! Every JSON response uses the [`ApiResult`] envelope.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard API response: either data or an error, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApiResult<T> {
    /// Request succeeded
    Success {
        /// Response payload
        data: T,
    },
    /// Request failed
    Error {
        /// Failure details
        error: ErrorResponse,
    },
}

impl<T> ApiResult<T> {
    /// Successful result
    pub fn ok(data: T) -> Self {
        Self::Success { data }
    }

    /// Failed result with a machine-readable code
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorResponse {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    /// True for [`ApiResult::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Data of a successful result
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Error { .. } => None,
        }
    }
}

/// Error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable error code, e.g. `not_found`
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// Outward-facing link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HrefResponse {
    /// Absolute URL
    pub href: String,
    /// `query` in development mode, `subdomain` in production
    pub mode: String,
}

/// Classification report for the current request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResolveResponse {
    /// Request host, as sent
    pub host: Option<String>,
    /// Classified path
    pub pathname: String,
    /// Tenant kind, e.g. `free_tier_view`
    pub tenant: String,
    /// Rewrite target, if the path is rewritten
    pub internal_path: Option<String>,
    /// The request carried a valid session
    pub authenticated: bool,
}

/// Rendered internal page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageView {
    /// Page identifier, e.g. `org_home`
    pub page: String,
    /// User the page belongs to or is shown for
    pub username: Option<String>,
    /// Org slug
    pub org: Option<String>,
    /// Presentation shortname
    pub shortname: Option<String>,
}

impl PageView {
    /// Page without details
    pub fn new(page: &str) -> Self {
        Self {
            page: page.into(),
            username: None,
            org: None,
            shortname: None,
        }
    }

    /// Set the username
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the org slug
    pub fn org(mut self, org: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self
    }

    /// Set the shortname
    pub fn shortname(mut self, shortname: impl Into<String>) -> Self {
        self.shortname = Some(shortname.into());
        self
    }
}
