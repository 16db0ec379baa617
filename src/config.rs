//! Router Configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default canonical root domain
pub const DEFAULT_ROOT_DOMAIN: &str = "pr.djl.foundation";

/// Default name of the rewrite trust header
pub const DEFAULT_TRUST_HEADER: &str = "x-tenant-rewrite";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid JSON
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Config values are unusable
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local and preview deployments
    Development,
    /// Public deployment on the root domain
    Production,
}

impl Environment {
    /// Parse `development`/`dev` or `production`/`prod`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// True in development
    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    /// URL scheme used for outward-facing links
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Development => "http",
            Self::Production => "https",
        }
    }
}

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Canonical root domain, all tenant logic is relative to it
    pub root_domain: String,
    /// Deployment environment
    pub environment: Environment,
    /// Listen address
    pub listen_addr: String,
    /// Header carrying the rewrite trust marker
    pub trust_header: String,
    /// Session settings
    pub session: SessionConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            root_domain: DEFAULT_ROOT_DOMAIN.into(),
            environment: Environment::Production,
            listen_addr: "0.0.0.0:3000".into(),
            trust_header: DEFAULT_TRUST_HEADER.into(),
            session: SessionConfig::default(),
        }
    }
}

/// Session token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie holding the session JWT
    pub cookie_name: String,
    /// HS256 signing secret
    pub secret: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "__session".into(),
            secret: "presentation-foundation-dev-secret-change-in-production".into(),
        }
    }
}

impl RouterConfig {
    /// Load from file
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PF_*` environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("PF_ROOT_DOMAIN") {
            self.root_domain = root;
        }
        let env = lookup("PF_ENV").or_else(|| lookup("NODE_ENV"));
        if let Some(env) = env.as_deref().and_then(Environment::parse) {
            self.environment = env;
        }
        if let Some(addr) = lookup("PF_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Some(secret) = lookup("PF_SESSION_SECRET") {
            self.session.secret = secret;
        }
        if let Some(header) = lookup("PF_TRUST_HEADER") {
            self.trust_header = header;
        }
        self.root_domain = self.root_domain.trim().trim_end_matches('.').to_ascii_lowercase();
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_domain.is_empty() {
            return Err(ConfigError::Invalid("root_domain is empty".into()));
        }
        if self.root_domain.contains("://") || self.root_domain.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "root_domain must be a bare host, got {}",
                self.root_domain
            )));
        }
        if axum::http::HeaderName::from_bytes(self.trust_header.as_bytes()).is_err() {
            return Err(ConfigError::Invalid(format!(
                "trust_header is not a valid header name: {}",
                self.trust_header
            )));
        }
        if self.session.secret.is_empty() {
            return Err(ConfigError::Invalid("session secret is empty".into()));
        }
        Ok(())
    }
}
