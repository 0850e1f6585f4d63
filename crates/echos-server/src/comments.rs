use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use echos_types::api::{Caller, CreateCommentRequest};

use crate::state::{AppState, error_status, join_error};

pub async fn add_comment(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let service = state.service.clone();

    let comment = tokio::task::spawn_blocking(move || {
        service.add_comment(&caller, post_id, &req.content)
    })
    .await
    .map_err(join_error)?
    .map_err(error_status)?
    .ok_or(StatusCode::NOT_FOUND)?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Extension(caller): Extension<Caller>,
) -> Result<StatusCode, StatusCode> {
    let service = state.service.clone();

    let deleted = tokio::task::spawn_blocking(move || service.delete_comment(&caller, comment_id))
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
