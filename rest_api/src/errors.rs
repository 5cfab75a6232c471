// rest_api/src/errors.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lib::StorageError;
use log::error;
use models::ValidationError;
use security::AuthError;
use serde_json::json;
use thiserror::Error;

use crate::ai::AiError;

/// Message returned for any server-side failure. Details go to the log only.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

// Define the REST API error enum
#[derive(Debug, Error)]
pub enum RestApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    TooManyRequests(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl RestApiError {
    pub fn not_found(what: &str) -> Self {
        RestApiError::NotFound(format!("{} not found", what))
    }
}

impl From<AiError> for RestApiError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::MissingApiKey | AiError::InvalidApiKey(_) => {
                RestApiError::Config(format!("AI service is not configured correctly: {}", e))
            }
            AiError::RateLimited => {
                RestApiError::TooManyRequests("AI service rate limit reached, please retry later".to_string())
            }
            AiError::SafetyBlocked(reason) => {
                RestApiError::BadRequest(format!("The request was blocked by the AI content filter: {}", reason))
            }
            other => RestApiError::Anyhow(anyhow::Error::new(other)),
        }
    }
}

// Implement IntoResponse for RestApiError to convert it into an HTTP response
impl IntoResponse for RestApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            RestApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            RestApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            RestApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            RestApiError::Config(msg) => {
                error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Configuration error: {}", msg))
            }
            RestApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            RestApiError::Storage(e) if e.is_client_error() => (StatusCode::BAD_REQUEST, e.to_string()),
            RestApiError::Storage(e) => {
                error!("Storage error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
            }
            RestApiError::Auth(e) => match e {
                AuthError::UserExists | AuthError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken(_) => {
                    (StatusCode::UNAUTHORIZED, e.to_string())
                }
                AuthError::RoleMismatch { .. } => (StatusCode::FORBIDDEN, e.to_string()),
                other => {
                    error!("Authentication failure: {}", other);
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
                }
            },
            RestApiError::Anyhow(e) => {
                error!("Unhandled error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: impl Into<RestApiError>) -> StatusCode {
        e.into().into_response().status()
    }

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(status_of(ValidationError::Required("name")), StatusCode::BAD_REQUEST);
        let duplicate = StorageError::Duplicate {
            collection: "patients".into(),
            field: "nationalId".into(),
            value: "X1".into(),
        };
        assert_eq!(status_of(duplicate), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AuthError::UserExists), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(RestApiError::not_found("Patient")), StatusCode::NOT_FOUND);
    }

    #[test]
    fn ai_errors_follow_the_failure_table() {
        assert_eq!(status_of(AiError::MissingApiKey), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(AiError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status_of(AiError::SafetyBlocked("SAFETY".into())), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn server_errors_hide_details() {
        let response = RestApiError::Anyhow(anyhow::anyhow!("disk on fire")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let storage = StorageError::Internal("lock poisoned".into());
        assert_eq!(status_of(storage), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
