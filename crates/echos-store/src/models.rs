//! Database row types. These map directly to SQLite rows and stay
//! distinct from the echos-types domain models to keep the store layer
//! independent; conversion happens at the query boundary.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use echos_types::models::{Comment, Post, Tag, User};

use crate::{Result, StoreError};

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

pub struct PostRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub is_read: bool,
    pub importance: Option<String>,
}

pub struct TagRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl UserRow {
    pub fn into_user(self) -> Result<User> {
        Ok(User {
            id: parse_id(&self.id, "users.id")?,
            role: self
                .role
                .parse()
                .map_err(|e| StoreError::Storage(format!("corrupt role on user {}: {e}", self.id)))?,
            created_at: parse_ts(&self.created_at, &self.id),
            email: self.email,
        })
    }
}

impl PostRow {
    pub fn into_post(self) -> Result<Post> {
        Ok(Post {
            id: parse_id(&self.id, "posts.id")?,
            author_id: parse_id(&self.author_id, "posts.author_id")?,
            created_at: parse_ts(&self.created_at, &self.id),
            updated_at: self.updated_at.as_deref().map(|ts| parse_ts(ts, &self.id)),
            is_read: self.is_read,
            importance: match self.importance.as_deref() {
                None => None,
                Some(raw) => Some(raw.parse().map_err(|e| {
                    StoreError::Storage(format!("corrupt importance on post {}: {e}", self.id))
                })?),
            },
            title: self.title,
            content: self.content,
        })
    }
}

impl TagRow {
    pub fn into_tag(self) -> Result<Tag> {
        Ok(Tag {
            id: parse_id(&self.id, "tags.id")?,
            created_at: parse_ts(&self.created_at, &self.id),
            name: self.name,
            color: self.color,
        })
    }
}

impl CommentRow {
    pub fn into_comment(self) -> Result<Comment> {
        Ok(Comment {
            id: parse_id(&self.id, "comments.id")?,
            post_id: parse_id(&self.post_id, "comments.post_id")?,
            author_id: parse_id(&self.author_id, "comments.author_id")?,
            created_at: parse_ts(&self.created_at, &self.id),
            updated_at: self.updated_at.as_deref().map(|ts| parse_ts(ts, &self.id)),
            content: self.content,
        })
    }
}

pub(crate) fn parse_id(raw: &str, column: &str) -> Result<Uuid> {
    raw.parse()
        .map_err(|e| StoreError::Storage(format!("corrupt {column} '{raw}': {e}")))
}

/// Rows written from Rust carry RFC 3339 timestamps; rows created by the
/// schema's `datetime('now')` default carry `YYYY-MM-DD HH:MM:SS`. Accept
/// both, warn and fall back on anything else.
pub(crate) fn parse_ts(raw: &str, row_id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on row '{}': {}", raw, row_id, e);
            DateTime::default()
        })
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

pub(crate) fn ts_text(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}
