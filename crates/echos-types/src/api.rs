use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ImportanceLevel, LikeState, Role};

// -- Caller identity --

/// The authenticated caller as supplied by the upstream identity provider.
/// Canonical definition lives here in echos-types so the service and the
/// server middleware share one type.
///
/// The three fields arrive pre-authenticated; nothing in this workspace
/// re-verifies credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    /// Honored only for Leader/Admin callers; silently dropped otherwise.
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub importance: Option<ImportanceLevel>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewPostRequest {
    pub is_read: bool,
    #[serde(default)]
    pub importance: Option<ImportanceLevel>,
}

// -- Likes --

#[derive(Debug, Serialize)]
pub struct ToggleLikeResponse {
    pub state: LikeState,
}

#[derive(Debug, Serialize)]
pub struct LikedResponse {
    pub liked: bool,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub content: String,
}

// -- Tags --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
}

// -- Admin --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeRoleRequest {
    pub role: Role,
}
