use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::{
    error::ApiError,
    state::AppState,
    users::dto::{
        ListQuery, UserCountResponse, UserDeletedResponse, UserListResponse, UserMessageResponse,
        UserResponse,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/count", get(count_users))
        .route(
            "/users/:id",
            get(show_user).put(update_user).delete(destroy_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    Ok(Json(state.users.list(&query).await?))
}

#[instrument(skip(state))]
pub async fn count_users(
    State(state): State<AppState>,
) -> Result<Json<UserCountResponse>, ApiError> {
    Ok(Json(state.users.count().await?))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<UserMessageResponse>), ApiError> {
    let created = state.users.create(&payload).await?;
    let location = format!("/users/{}", created.user.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

#[instrument(skip(state))]
pub async fn show_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(state.users.show(&id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<UserMessageResponse>, ApiError> {
    Ok(Json(state.users.update(&id, &payload).await?))
}

#[instrument(skip(state))]
pub async fn destroy_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserDeletedResponse>, ApiError> {
    Ok(Json(state.users.destroy(&id).await?))
}
