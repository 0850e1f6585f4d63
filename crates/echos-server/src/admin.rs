use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use echos_types::api::{Caller, ChangeRoleRequest, CreateUserRequest};

use crate::state::{AppState, error_status, join_error};

pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, StatusCode> {
    let service = state.service.clone();

    let users = tokio::task::spawn_blocking(move || service.list_users(&caller))
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    Ok(Json(users))
}

/// Identity-sync point: the integrator provisions the store's user row
/// here; the id minted in the store is the one the platform knows.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let service = state.service.clone();

    let user = tokio::task::spawn_blocking(move || {
        service.create_user(&caller, &req.email, req.role)
    })
    .await
    .map_err(join_error)?
    .map_err(error_status)?
    .ok_or(StatusCode::FORBIDDEN)?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn change_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<StatusCode, StatusCode> {
    let service = state.service.clone();

    let changed = tokio::task::spawn_blocking(move || {
        service.change_user_role(&caller, user_id, req.role)
    })
    .await
    .map_err(join_error)?
    .map_err(error_status)?;

    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(caller): Extension<Caller>,
) -> Result<StatusCode, StatusCode> {
    let service = state.service.clone();

    let deleted = tokio::task::spawn_blocking(move || service.delete_user(&caller, user_id))
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
