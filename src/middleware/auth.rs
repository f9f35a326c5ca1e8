use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{self, AuthError};
use crate::config;
use crate::error::ApiError;

/// JWT authentication middleware that verifies the bearer credential and
/// injects the resolved identity into request extensions.
///
/// Verification itself is pure computation; any failure ends the request
/// here with a 401 and its classified reason.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // A present header that is not valid UTF-8 is malformed, not missing
    let raw_header = match headers.get(header::AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedCredential)?),
        None => None,
    };

    let secret = &config::config().security.auth_secret;
    let identity = auth::verify_bearer(raw_header, secret)?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
