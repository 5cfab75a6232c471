// rest_api/src/extract.rs

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use log::debug;
use serde::de::DeserializeOwned;

use crate::errors::RestApiError;

/// `Json<T>` whose rejections are 400 `{message}` bodies instead of axum's
/// plain-text 415/422 responses.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RestApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => {
                let message = describe(&rejection);
                debug!("Rejected request body: {}", message);
                Err(RestApiError::BadRequest(message))
            }
        }
    }
}

fn describe(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body".to_string(),
        other => other.body_text(),
    }
}

/// `Query<T>` with the same `{message}` rejection as `ValidJson`.
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RestApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ValidQuery(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                debug!("Rejected query string: {}", message);
                Err(RestApiError::BadRequest(message))
            }
        }
    }
}
