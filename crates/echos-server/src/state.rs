use std::sync::Arc;

use axum::http::StatusCode;
use tracing::error;

use echos_service::{ContentService, StoreError};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub service: ContentService,
}

/// Map store failures onto the wire: malformed input is the caller's
/// fault, anything else is ours.
pub fn error_status(err: StoreError) -> StatusCode {
    match err {
        StoreError::Validation(msg) => {
            error!("Rejected request: {}", msg);
            StatusCode::BAD_REQUEST
        }
        StoreError::Storage(msg) => {
            error!("Storage fault: {}", msg);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn join_error(err: tokio::task::JoinError) -> StatusCode {
    error!("spawn_blocking join error: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR
}
