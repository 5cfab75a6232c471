// security/src/middleware.rs
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use log::{debug, error, warn};
use serde_json::json;

use crate::roles::{AccessPolicy, Action, Resource};
use crate::{AuthError, AuthService};

/// State for `authorize`. With no resource the guard only authenticates.
#[derive(Clone)]
pub struct Guard {
    pub auth: Arc<AuthService>,
    pub policy: Arc<AccessPolicy>,
    pub resource: Option<Resource>,
}

impl Guard {
    pub fn new(auth: Arc<AuthService>, policy: Arc<AccessPolicy>) -> Self {
        Guard { auth, policy, resource: None }
    }

    pub fn for_resource(&self, resource: Resource) -> Self {
        Guard {
            auth: Arc::clone(&self.auth),
            policy: Arc::clone(&self.policy),
            resource: Some(resource),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Resolves the caller, checks the policy for the guarded resource and
/// attaches an `AuthUser` to the request extensions.
pub async fn authorize(State(guard): State<Guard>, mut request: Request, next: Next) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return reject(StatusCode::UNAUTHORIZED, &AuthError::MissingToken.to_string());
    };

    let user = match guard.auth.authenticate(token).await {
        Ok(user) => user,
        Err(AuthError::InvalidToken(reason)) => {
            debug!("Rejected token: {}", reason);
            return reject(StatusCode::UNAUTHORIZED, "Invalid or expired token");
        }
        Err(e) => {
            error!("Failed to resolve caller: {}", e);
            return reject(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    if let Some(resource) = guard.resource {
        let action = Action::from_method(request.method());
        if !guard.policy.allows(user.role, resource, action) {
            warn!("{} {} denied {} on {}", user.role, user.email, action, resource);
            return reject(
                StatusCode::FORBIDDEN,
                &format!("Access denied: {} may not {} {}", user.role, action, resource),
            );
        }
    }

    request.extensions_mut().insert(user);
    next.run(request).await
}
