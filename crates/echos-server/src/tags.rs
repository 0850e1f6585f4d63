use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use echos_types::api::{Caller, CreateTagRequest};

use crate::state::{AppState, error_status, join_error};

pub async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let service = state.service.clone();

    let tags = tokio::task::spawn_blocking(move || service.list_tags())
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    Ok(Json(tags))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let service = state.service.clone();

    let tag = tokio::task::spawn_blocking(move || service.get_tag(tag_id))
        .await
        .map_err(join_error)?
        .map_err(error_status)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(tag))
}

pub async fn create_tag(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateTagRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let service = state.service.clone();

    let tag = tokio::task::spawn_blocking(move || {
        service.create_tag(&caller, &req.name, &req.color)
    })
    .await
    .map_err(join_error)?
    .map_err(error_status)?
    .ok_or(StatusCode::FORBIDDEN)?;

    Ok((StatusCode::CREATED, Json(tag)))
}
