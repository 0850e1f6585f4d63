use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use echos_types::models::{
    CommentView, ImportanceLevel, Like, LikeView, Post, PostDetail, PostSummary, User,
};

use crate::error::is_fk_violation;
use crate::models::{CommentRow, PostRow, TagRow, UserRow, now, parse_id, parse_ts, ts_text};
use crate::{Database, Result, StoreError};

pub struct NewPost<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub author_id: Uuid,
    pub tag_ids: &'a [Uuid],
    pub is_read: bool,
    pub importance: Option<ImportanceLevel>,
}

impl Database {
    /// Insert a post and its tag links in one transaction.
    pub fn create_post(&self, new: NewPost<'_>) -> Result<Post> {
        let title = new.title.trim();
        let content = new.content.trim();
        if title.is_empty() {
            return Err(StoreError::Validation("title must not be empty".into()));
        }
        if content.is_empty() {
            return Err(StoreError::Validation("content must not be empty".into()));
        }

        let post = Post {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            author_id: new.author_id,
            created_at: now(),
            updated_at: None,
            is_read: new.is_read,
            importance: new.importance,
        };

        self.with_write(|conn| {
            let tx = conn.transaction()?;

            match tx.execute(
                "INSERT INTO posts (id, title, content, author_id, created_at, is_read, importance)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    post.id.to_string(),
                    post.title,
                    post.content,
                    post.author_id.to_string(),
                    ts_text(post.created_at),
                    post.is_read,
                    post.importance.map(|i| i.as_str()),
                ],
            ) {
                Ok(_) => {}
                Err(e) if is_fk_violation(&e) => {
                    return Err(StoreError::Validation(format!(
                        "author {} does not exist",
                        new.author_id
                    )));
                }
                Err(e) => return Err(e.into()),
            }

            for tag_id in new.tag_ids {
                // OR IGNORE dedups repeated tag ids; FK failures still error.
                match tx.execute(
                    "INSERT OR IGNORE INTO post_tags (post_id, tag_id, created_at)
                     VALUES (?1, ?2, ?3)",
                    params![
                        post.id.to_string(),
                        tag_id.to_string(),
                        ts_text(post.created_at)
                    ],
                ) {
                    Ok(_) => {}
                    Err(e) if is_fk_violation(&e) => {
                        return Err(StoreError::Validation(format!(
                            "tag {tag_id} does not exist"
                        )));
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            tx.commit()?;
            Ok(())
        })?;

        Ok(post)
    }

    /// Detail view: post plus resolved author, tags, likes (with liking
    /// users) and comments (with authors). Authors are LEFT JOINed;
    /// a missing account reads as `None`, never as an error.
    pub fn find_post(&self, id: Uuid) -> Result<Option<PostDetail>> {
        self.with_read(|conn| {
            let Some((post, author)) = query_post_with_author(conn, id)? else {
                return Ok(None);
            };

            let tags = {
                let mut stmt = conn.prepare(
                    "SELECT t.id, t.name, t.color, t.created_at
                     FROM tags t
                     JOIN post_tags pt ON pt.tag_id = t.id
                     WHERE pt.post_id = ?1
                     ORDER BY t.name ASC",
                )?;
                let rows = stmt
                    .query_map([id.to_string()], |row| {
                        Ok(TagRow {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            color: row.get(2)?,
                            created_at: row.get(3)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows.into_iter()
                    .map(TagRow::into_tag)
                    .collect::<Result<Vec<_>>>()?
            };

            let likes = {
                let mut stmt = conn.prepare(
                    "SELECT l.id, l.post_id, l.user_id, l.created_at,
                            u.id, u.email, u.role, u.created_at
                     FROM likes l
                     LEFT JOIN users u ON l.user_id = u.id
                     WHERE l.post_id = ?1
                     ORDER BY l.created_at ASC",
                )?;
                let rows = stmt
                    .query_map([id.to_string()], |row| {
                        Ok((
                            (
                                row.get::<_, String>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, String>(2)?,
                                row.get::<_, String>(3)?,
                            ),
                            optional_user_row(row, 4)?,
                        ))
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                rows.into_iter()
                    .map(|((lid, pid, uid, created), user)| {
                        Ok(LikeView {
                            like: Like {
                                id: parse_id(&lid, "likes.id")?,
                                post_id: parse_id(&pid, "likes.post_id")?,
                                user_id: parse_id(&uid, "likes.user_id")?,
                                created_at: parse_ts(&created, &lid),
                            },
                            user: user.map(UserRow::into_user).transpose()?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?
            };

            let comments = {
                let mut stmt = conn.prepare(
                    "SELECT c.id, c.post_id, c.author_id, c.content, c.created_at, c.updated_at,
                            u.id, u.email, u.role, u.created_at
                     FROM comments c
                     LEFT JOIN users u ON c.author_id = u.id
                     WHERE c.post_id = ?1
                     ORDER BY c.created_at ASC",
                )?;
                let rows = stmt
                    .query_map([id.to_string()], |row| {
                        Ok((
                            CommentRow {
                                id: row.get(0)?,
                                post_id: row.get(1)?,
                                author_id: row.get(2)?,
                                content: row.get(3)?,
                                created_at: row.get(4)?,
                                updated_at: row.get(5)?,
                            },
                            optional_user_row(row, 6)?,
                        ))
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                rows.into_iter()
                    .map(|(comment, author)| {
                        Ok(CommentView {
                            comment: comment.into_comment()?,
                            author: author.map(UserRow::into_user).transpose()?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?
            };

            Ok(Some(PostDetail {
                post,
                author,
                tags,
                likes,
                comments,
            }))
        })
    }

    /// List view, newest first: eager author and like count, no comments.
    pub fn list_posts(&self) -> Result<Vec<PostSummary>> {
        self.with_read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.title, p.content, p.author_id, p.created_at, p.updated_at,
                        p.is_read, p.importance,
                        u.id, u.email, u.role, u.created_at,
                        (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count
                 FROM posts p
                 LEFT JOIN users u ON p.author_id = u.id
                 ORDER BY p.created_at DESC",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        post_row(row, 0)?,
                        optional_user_row(row, 8)?,
                        row.get::<_, i64>(12)?,
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(post, author, like_count)| {
                    Ok(PostSummary {
                        post: post.into_post()?,
                        author: author.map(UserRow::into_user).transpose()?,
                        like_count,
                    })
                })
                .collect()
        })
    }

    pub fn update_post(&self, id: Uuid, title: &str, content: &str) -> Result<bool> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() {
            return Err(StoreError::Validation("title must not be empty".into()));
        }
        if content.is_empty() {
            return Err(StoreError::Validation("content must not be empty".into()));
        }

        self.with_write(|conn| {
            let changed = conn.execute(
                "UPDATE posts SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4",
                params![title, content, ts_text(now()), id.to_string()],
            )?;
            Ok(changed > 0)
        })
    }

    /// Cascades post_tags, likes and comments via the schema's FK rules.
    pub fn delete_post(&self, id: Uuid) -> Result<bool> {
        self.with_write(|conn| {
            let changed = conn.execute("DELETE FROM posts WHERE id = ?1", [id.to_string()])?;
            Ok(changed > 0)
        })
    }

    /// Leader triage flags.
    pub fn set_post_review(
        &self,
        id: Uuid,
        is_read: bool,
        importance: Option<ImportanceLevel>,
    ) -> Result<bool> {
        self.with_write(|conn| {
            let changed = conn.execute(
                "UPDATE posts SET is_read = ?1, importance = ?2 WHERE id = ?3",
                params![is_read, importance.map(|i| i.as_str()), id.to_string()],
            )?;
            Ok(changed > 0)
        })
    }
}

fn query_post_with_author(conn: &Connection, id: Uuid) -> Result<Option<(Post, Option<User>)>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.title, p.content, p.author_id, p.created_at, p.updated_at,
                p.is_read, p.importance,
                u.id, u.email, u.role, u.created_at
         FROM posts p
         LEFT JOIN users u ON p.author_id = u.id
         WHERE p.id = ?1",
    )?;

    let row = stmt
        .query_row([id.to_string()], |row| {
            Ok((post_row(row, 0)?, optional_user_row(row, 8)?))
        })
        .optional()?;

    let Some((post, author)) = row else {
        return Ok(None);
    };

    Ok(Some((
        post.into_post()?,
        author.map(UserRow::into_user).transpose()?,
    )))
}

fn post_row(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(base)?,
        title: row.get(base + 1)?,
        content: row.get(base + 2)?,
        author_id: row.get(base + 3)?,
        created_at: row.get(base + 4)?,
        updated_at: row.get(base + 5)?,
        is_read: row.get(base + 6)?,
        importance: row.get(base + 7)?,
    })
}

/// Read a LEFT JOINed users projection starting at `base`; all-NULL
/// columns mean the account no longer exists.
fn optional_user_row(
    row: &rusqlite::Row<'_>,
    base: usize,
) -> rusqlite::Result<Option<UserRow>> {
    let id: Option<String> = row.get(base)?;
    match id {
        None => Ok(None),
        Some(id) => Ok(Some(UserRow {
            id,
            email: row.get(base + 1)?,
            role: row.get(base + 2)?,
            created_at: row.get(base + 3)?,
        })),
    }
}
