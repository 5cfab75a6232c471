// rest_api/src/handlers/users.rs
// Staff accounts. Creation goes through /api/auth/register; responses only
// ever carry `UserProfile`, never the password hash.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use log::info;
use models::errors::require;
use models::identifiers::normalize_email;
use models::medical::{Role, UserProfile};
use security::hash_password;
use serde::Deserialize;
use serde_json::Value;

use super::{deleted, ApiResult};
use crate::errors::RestApiError;
use crate::extract::{ValidJson, ValidQuery};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/:id", get(get_user).put(update_user).patch(update_user).delete(delete_user))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    /// Plaintext; re-hashed before storing.
    #[serde(default)]
    pub password: Option<String>,
}

async fn list_users(State(state): State<AppState>, ValidQuery(query): ValidQuery<UserQuery>) -> ApiResult<Json<Vec<UserProfile>>> {
    let mut users = state.users().all().await?;
    if let Some(role) = query.role {
        users.retain(|user| user.role == role);
    }
    users.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(Json(users.iter().map(UserProfile::from).collect()))
}

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<UserProfile>> {
    state
        .users()
        .find(&id)
        .await?
        .map(|user| Json(user.profile()))
        .ok_or_else(|| RestApiError::not_found("User"))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(update): ValidJson<UserUpdate>,
) -> ApiResult<Json<UserProfile>> {
    let mut user = state
        .users()
        .find(&id)
        .await?
        .ok_or_else(|| RestApiError::not_found("User"))?;

    if let Some(name) = update.name {
        require("name", &name)?;
        user.name = name;
    }
    if let Some(email) = update.email {
        user.email = normalize_email(&email)?;
    }
    if let Some(role) = update.role {
        user.role = role;
    }
    if let Some(password) = update.password {
        require("password", &password)?;
        user.password_hash = hash_password(&password)?;
        info!("Password changed for user {}", user.id);
    }

    state
        .users()
        .replace(user)
        .await?
        .map(|user| Json(user.profile()))
        .ok_or_else(|| RestApiError::not_found("User"))
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state
        .users()
        .remove(&id)
        .await?
        .ok_or_else(|| RestApiError::not_found("User"))?;
    Ok(deleted("User", &id))
}
