use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Query extractor whose rejection uses the standard error body.
///
/// Axum's `Query` rejects unparsable parameters (e.g. `?completed=banana`)
/// with a plain-text 400; every other failure in this API renders as
/// `{error, message, code}`, so query deserialization failures go through
/// the same shape as a 422.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(ApiError::validation_error("query", rejection.body_text())),
        }
    }
}
