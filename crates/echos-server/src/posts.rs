use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use echos_types::api::{Caller, CreatePostRequest, ReviewPostRequest, UpdatePostRequest};

use crate::state::{AppState, error_status, join_error};

pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let service = state.service.clone();

    let posts = tokio::task::spawn_blocking(move || service.list_posts())
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let service = state.service.clone();

    let post = tokio::task::spawn_blocking(move || {
        service.create_post(
            &caller,
            &req.title,
            &req.content,
            &req.tag_ids,
            req.is_read,
            req.importance,
        )
    })
    .await
    .map_err(join_error)?
    .map_err(error_status)?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let service = state.service.clone();

    let detail = tokio::task::spawn_blocking(move || service.get_post(post_id))
        .await
        .map_err(join_error)?
        .map_err(error_status)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(detail))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<StatusCode, StatusCode> {
    let service = state.service.clone();

    let updated = tokio::task::spawn_blocking(move || {
        service.update_post(&caller, post_id, &req.title, &req.content)
    })
    .await
    .map_err(join_error)?
    .map_err(error_status)?;

    // refusal and absence collapse to the same answer
    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(caller): Extension<Caller>,
) -> Result<StatusCode, StatusCode> {
    let service = state.service.clone();

    let deleted = tokio::task::spawn_blocking(move || service.delete_post(&caller, post_id))
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

pub async fn review_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<ReviewPostRequest>,
) -> Result<StatusCode, StatusCode> {
    let service = state.service.clone();

    let updated = tokio::task::spawn_blocking(move || {
        service.review_post(&caller, post_id, req.is_read, req.importance)
    })
    .await
    .map_err(join_error)?
    .map_err(error_status)?;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
