pub mod ownership;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use ownership::{authorize, ActionKind};

/// Verification failures, all of which map to HTTP 401.
/// Messages never include the secret or the raw token.
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredential,

    #[error("Invalid authorization header format. Expected 'Bearer <token>'")]
    MalformedCredential,

    #[error("Invalid token: {0}")]
    InvalidCredential(String),

    #[error("Token has expired")]
    ExpiredCredential,

    #[error("Token missing user identifier")]
    MissingIdentifier,
}

/// Authenticated identity for one request. Not persisted.
///
/// `claims` is the full decoded claim set; `id` is the canonical user
/// identifier normalized out of it. Callers read only `id`.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub claims: Map<String, Value>,
}

/// Verify a bearer credential and produce the authenticated identity.
///
/// Pure function of (header, secret, current time): no I/O, no caching.
/// Claims are treated as an open key-value map so any provider that supplies
/// either a standard `sub` claim or a pre-existing `id` field is accepted;
/// `sub` is copied into `id` before the identifier requirement is enforced.
pub fn verify_bearer(raw_header: Option<&str>, secret: &str) -> Result<Identity, AuthError> {
    let raw = match raw_header {
        Some(v) if !v.is_empty() => v,
        _ => return Err(AuthError::MissingCredential),
    };

    let token = raw
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedCredential)?;

    if secret.is_empty() {
        return Err(AuthError::InvalidCredential(
            "authentication secret not configured".to_string(),
        ));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data =
        decode::<Map<String, Value>>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
                _ => AuthError::InvalidCredential(e.to_string()),
            }
        })?;

    let mut claims = token_data.claims;

    // Normalize the standard "sub" claim into a canonical "id" field
    if let Some(sub) = claims.get("sub").and_then(Value::as_str) {
        let sub = sub.to_string();
        claims.insert("id".to_string(), Value::String(sub));
    }

    let id = claims
        .get("id")
        .and_then(Value::as_str)
        .ok_or(AuthError::MissingIdentifier)?
        .to_string();

    Ok(Identity { id, claims })
}

/// Claims issued by this service's token helper. Verification accepts any
/// claim shape; this struct only covers what we generate.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: sub.into(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token generation error: {0}")]
    Generation(String),

    #[error("Invalid token secret")]
    InvalidSecret,
}

/// Generate a signed HS256 token for the given claims.
pub fn generate_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| TokenError::Generation(e.to_string()))
}
