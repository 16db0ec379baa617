//! Session authentication
//!
//! Sessions are HS256 JWTs carried in the session cookie or an
//! `Authorization: Bearer` header. A token that fails verification makes the
//! request anonymous; it is never an error for routing.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::error::RouterError;
use crate::request::Principal;

/// Session JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    /// Display username
    pub username: String,
    /// Active organization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_slug: Option<String>,
    /// Expiry, seconds since the epoch
    pub exp: usize,
}

impl From<SessionClaims> for Principal {
    fn from(claims: SessionClaims) -> Self {
        Principal {
            username: claims.username,
            org_slug: claims
                .org_slug
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Session token verifier
#[derive(Clone)]
pub struct SessionVerifier {
    cookie_name: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionVerifier {
    /// Verifier for the configured cookie and secret
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    /// Issue a session token for a principal
    pub fn issue(&self, user_id: &str, principal: &Principal, ttl: chrono::Duration) -> Result<String, RouterError> {
        let exp = (chrono::Utc::now() + ttl).timestamp().max(0) as usize;
        let claims = SessionClaims {
            sub: user_id.to_string(),
            username: principal.username.clone(),
            org_slug: principal.org_slug.clone(),
            exp,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verify a session token
    pub fn verify(&self, token: &str) -> Result<SessionClaims, RouterError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }

    /// Principal of a request, if it carries a valid session
    pub fn principal(&self, headers: &HeaderMap) -> Option<Principal> {
        let token = bearer_token(headers).or_else(|| cookie_value(headers, &self.cookie_name))?;
        match self.verify(token) {
            Ok(claims) => Some(claims.into()),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring invalid session token");
                None
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn verifier() -> SessionVerifier {
        SessionVerifier::new(&SessionConfig::default())
    }

    fn acme_member() -> Principal {
        Principal {
            username: "alice".into(),
            org_slug: Some("acme".into()),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let verifier = verifier();
        let token = verifier
            .issue("user_1", &acme_member(), chrono::Duration::hours(1))
            .unwrap();
        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, "user_1");
        assert_eq!(claims.org_slug.as_deref(), Some("acme"));
    }

    #[test]
    fn test_principal_from_cookie() {
        let verifier = verifier();
        let token = verifier
            .issue("user_1", &acme_member(), chrono::Duration::hours(1))
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; __session={token}")).unwrap(),
        );
        assert_eq!(verifier.principal(&headers), Some(acme_member()));
    }

    #[test]
    fn test_principal_from_bearer() {
        let verifier = verifier();
        let token = verifier
            .issue("user_1", &acme_member(), chrono::Duration::hours(1))
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert!(verifier.principal(&headers).is_some());
    }

    #[test]
    fn test_expired_token_is_anonymous() {
        let verifier = verifier();
        let token = verifier
            .issue("user_1", &acme_member(), chrono::Duration::hours(-2))
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert!(verifier.principal(&headers).is_none());
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let other = SessionVerifier::new(&SessionConfig {
            secret: "someone-else".into(),
            ..Default::default()
        });
        let token = other
            .issue("user_1", &acme_member(), chrono::Duration::hours(1))
            .unwrap();
        assert!(verifier().verify(&token).is_err());
    }

    #[test]
    fn test_org_slug_claim_is_lowercased() {
        let claims = SessionClaims {
            sub: "user_1".into(),
            username: "alice".into(),
            org_slug: Some(" Acme ".into()),
            exp: 0,
        };
        assert_eq!(Principal::from(claims).org_slug.as_deref(), Some("acme"));
    }
}
