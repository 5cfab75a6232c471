// rest_api/src/handlers/rooms.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use log::info;
use models::medical::{NewRoom, Room, RoomSummary};
use serde_json::Value;

use super::{created, deleted, ApiResult};
use crate::errors::RestApiError;
use crate::extract::ValidJson;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/rooms", get(list_rooms).post(create_room))
        .route("/api/rooms/summary", get(room_summary))
        .route(
            "/api/rooms/:id",
            get(get_room).put(update_room).patch(update_room).delete(delete_room),
        )
}

async fn sorted_rooms(state: &AppState) -> ApiResult<Vec<Room>> {
    let mut rooms = state.rooms().all().await?;
    rooms.sort_by_key(|room| room.room_number);
    Ok(rooms)
}

async fn list_rooms(State(state): State<AppState>) -> ApiResult<Json<Vec<Room>>> {
    Ok(Json(sorted_rooms(&state).await?))
}

async fn room_summary(State(state): State<AppState>) -> ApiResult<Json<RoomSummary>> {
    Ok(Json(RoomSummary::of(&sorted_rooms(&state).await?)))
}

async fn get_room(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Room>> {
    state
        .rooms()
        .find(&id)
        .await?
        .map(Json)
        .ok_or_else(|| RestApiError::not_found("Room"))
}

async fn create_room(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<NewRoom>,
) -> ApiResult<(StatusCode, Json<Room>)> {
    let room = state.rooms().insert(Room::from_request(request)?).await?;
    info!("Added room {} ({})", room.room_number, room.name);
    Ok(created(room))
}

async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<Value>,
) -> ApiResult<Json<Room>> {
    state
        .rooms()
        .update(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| RestApiError::not_found("Room"))
}

async fn delete_room(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state
        .rooms()
        .remove(&id)
        .await?
        .ok_or_else(|| RestApiError::not_found("Room"))?;
    Ok(deleted("Room", &id))
}
