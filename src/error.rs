//! Router errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::config::ConfigError;
use crate::models::ApiResult;

/// Router error types
#[derive(Debug, Error)]
pub enum RouterError {
    /// Configuration could not be used
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Shortname that cannot name a tenant
    #[error("invalid shortname: {0}")]
    InvalidShortname(String),
    /// No page at this path
    #[error("not found: {0}")]
    NotFound(String),
    /// Reserved or protected page
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Redirect or rewrite target is not a valid URI
    #[error("invalid uri: {0}")]
    InvalidUri(String),
    /// Session token failure
    #[error("session error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),
    /// Socket or file failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RouterError {
    /// HTTP status of this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidShortname(_) | Self::InvalidUri(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Session(_) => StatusCode::UNAUTHORIZED,
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::InvalidShortname(_) => "invalid_shortname",
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidUri(_) => "invalid_uri",
            Self::Session(_) => "session",
            Self::Io(_) => "io",
        }
    }
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body: ApiResult<()> = ApiResult::error(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}
