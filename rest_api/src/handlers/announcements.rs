// rest_api/src/handlers/announcements.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use models::medical::{Announcement, NewAnnouncement};
use security::AuthUser;
use serde_json::Value;

use super::{created, deleted, ApiResult};
use crate::errors::RestApiError;
use crate::extract::ValidJson;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/announcements", get(list_announcements).post(create_announcement))
        .route(
            "/api/announcements/:id",
            get(get_announcement)
                .put(update_announcement)
                .patch(update_announcement)
                .delete(delete_announcement),
        )
}

async fn list_announcements(State(state): State<AppState>) -> ApiResult<Json<Vec<Announcement>>> {
    let mut announcements = state.announcements().all().await?;
    announcements.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(Json(announcements))
}

async fn get_announcement(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Announcement>> {
    state
        .announcements()
        .find(&id)
        .await?
        .map(Json)
        .ok_or_else(|| RestApiError::not_found("Announcement"))
}

async fn create_announcement(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(request): ValidJson<NewAnnouncement>,
) -> ApiResult<(StatusCode, Json<Announcement>)> {
    let announcement = Announcement::from_request(request, Some(user.name))?;
    Ok(created(state.announcements().insert(announcement).await?))
}

async fn update_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<Value>,
) -> ApiResult<Json<Announcement>> {
    state
        .announcements()
        .update(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| RestApiError::not_found("Announcement"))
}

async fn delete_announcement(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state
        .announcements()
        .remove(&id)
        .await?
        .ok_or_else(|| RestApiError::not_found("Announcement"))?;
    Ok(deleted("Announcement", &id))
}
