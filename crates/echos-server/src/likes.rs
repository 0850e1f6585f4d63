use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use echos_types::api::{Caller, LikedResponse, ToggleLikeResponse};

use crate::state::{AppState, error_status, join_error};

pub async fn toggle_like(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, StatusCode> {
    let service = state.service.clone();

    let transition = tokio::task::spawn_blocking(move || service.toggle_like(&caller, post_id))
        .await
        .map_err(join_error)?
        .map_err(error_status)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(ToggleLikeResponse { state: transition }))
}

pub async fn has_liked(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, StatusCode> {
    let service = state.service.clone();

    let liked = tokio::task::spawn_blocking(move || service.has_liked(&caller, post_id))
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    Ok(Json(LikedResponse { liked }))
}
