//! Verifies session tokens issued by the external identity provider.
//!
//! The token is read from `Authorization: Bearer <jwt>` or, for browser requests, from the
//! `__session` cookie. Its `sub` claim becomes the caller id.

use crate::config::{IdentityConfig, IdentityKey};
use crate::domain::Caller;
use crate::ports::identity::IdentityResolver;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

const SESSION_COOKIE: &str = "__session";

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
}

pub struct JwtIdentityResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    pub fn new(key: &IdentityKey, issuer: Option<&str>) -> Result<Self, jsonwebtoken::errors::Error> {
        let (key, algorithm) = match key {
            IdentityKey::RsaPem(pem) => (DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256),
            IdentityKey::Secret(secret) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
        };
        let mut validation = Validation::new(algorithm);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        Ok(Self { key, validation })
    }

    /// `None` when no key is configured: every request is then anonymous.
    pub fn from_config(config: &IdentityConfig) -> Result<Option<Self>, jsonwebtoken::errors::Error> {
        config
            .key
            .as_ref()
            .map(|key| Self::new(key, config.issuer.as_deref()))
            .transpose()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|token| !token.is_empty())
}

impl IdentityResolver for JwtIdentityResolver {
    fn resolve(&self, headers: &HeaderMap) -> Option<Caller> {
        let token = bearer_token(headers).or_else(|| session_cookie(headers))?;
        match decode::<SessionClaims>(token, &self.key, &self.validation) {
            Ok(data) if !data.claims.sub.is_empty() => Some(Caller {
                user_id: data.claims.sub,
            }),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "rejected session token");
                None
            }
        }
    }
}

/// Used when no identity key is configured.
pub struct AnonymousResolver;

impl IdentityResolver for AnonymousResolver {
    fn resolve(&self, _headers: &HeaderMap) -> Option<Caller> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    const SECRET: &str = "test-secret";

    #[derive(Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        exp: usize,
        iss: &'a str,
    }

    fn token(sub: &str, exp: usize, iss: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &Claims { sub, exp, iss },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    fn resolver(issuer: Option<&str>) -> JwtIdentityResolver {
        JwtIdentityResolver::new(&IdentityKey::Secret(SECRET.to_string()), issuer).unwrap()
    }

    #[test]
    fn test_bearer_token_resolves_subject() {
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token("user_42", far_future(), "idp"));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());

        let caller = resolver(None).resolve(&headers).unwrap();
        assert_eq!(caller.user_id, "user_42");
    }

    #[test]
    fn test_session_cookie_resolves_subject() {
        let mut headers = HeaderMap::new();
        let value = format!("theme=dark; __session={}", token("user_7", far_future(), "idp"));
        headers.insert(COOKIE, HeaderValue::from_str(&value).unwrap());

        assert_eq!(resolver(None).resolve(&headers).unwrap().user_id, "user_7");
    }

    #[test]
    fn test_expired_token_is_anonymous() {
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token("user_42", 1_000, "idp"));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());

        assert!(resolver(None).resolve(&headers).is_none());
    }

    #[test]
    fn test_wrong_issuer_is_anonymous() {
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token("user_42", far_future(), "someone-else"));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());

        assert!(resolver(Some("idp")).resolve(&headers).is_none());
    }

    #[test]
    fn test_missing_token_is_anonymous() {
        assert!(resolver(None).resolve(&HeaderMap::new()).is_none());
        assert!(AnonymousResolver.resolve(&HeaderMap::new()).is_none());
    }
}
