// rest_api/src/handlers/auth.rs

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};
use security::{authorize, AuthUser, Guard, LoginOutcome, UserLogin, UserRegistration};
use serde_json::{json, Value};

use super::{created, ApiResult};
use crate::extract::ValidJson;
use crate::AppState;

pub fn routes(guard: &Guard) -> Router<AppState> {
    let me = Router::new()
        .route("/api/auth/me", get(me_handler))
        .route_layer(from_fn_with_state(guard.clone(), authorize));

    Router::new()
        .route("/api/auth/register", post(register_user_handler))
        .route("/api/auth/login", post(login_handler))
        .merge(me)
}

// Handler for /api/auth/register
async fn register_user_handler(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<UserRegistration>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let user = state.auth.register_user(payload).await?;
    Ok(created(json!({ "message": "User registered successfully", "user": user })))
}

// Handler for /api/auth/login
async fn login_handler(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<UserLogin>,
) -> ApiResult<Json<LoginOutcome>> {
    Ok(Json(state.auth.login_user(payload).await?))
}

async fn me_handler(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
    Json(user)
}
