use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use echos_types::models::Comment;

use crate::error::is_fk_violation;
use crate::models::{CommentRow, now, ts_text};
use crate::{Database, Result, StoreError};

impl Database {
    /// Returns `None` when the post does not exist.
    pub fn create_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StoreError::Validation("content must not be empty".into()));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            content: content.to_string(),
            created_at: now(),
            updated_at: None,
        };

        self.with_write(|conn| {
            let insert = conn.execute(
                "INSERT INTO comments (id, post_id, author_id, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    comment.id.to_string(),
                    comment.post_id.to_string(),
                    comment.author_id.to_string(),
                    comment.content,
                    ts_text(comment.created_at)
                ],
            );

            match insert {
                Ok(_) => Ok(Some(())),
                Err(e) if is_fk_violation(&e) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .map(|inserted| inserted.map(|()| comment))
    }

    pub fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        self.with_read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, post_id, author_id, content, created_at, updated_at
                 FROM comments WHERE id = ?1",
            )?;

            let row = stmt
                .query_row([id.to_string()], |row| {
                    Ok(CommentRow {
                        id: row.get(0)?,
                        post_id: row.get(1)?,
                        author_id: row.get(2)?,
                        content: row.get(3)?,
                        created_at: row.get(4)?,
                        updated_at: row.get(5)?,
                    })
                })
                .optional()?;

            row.map(CommentRow::into_comment).transpose()
        })
    }

    pub fn delete_comment(&self, id: Uuid) -> Result<bool> {
        self.with_write(|conn| {
            let changed = conn.execute("DELETE FROM comments WHERE id = ?1", [id.to_string()])?;
            Ok(changed > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewPost;
    use echos_types::models::Role;

    #[test]
    fn comment_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        let author = db.create_user("author@example.com", Role::Member).unwrap();
        let post = db
            .create_post(NewPost {
                title: "title",
                content: "body",
                author_id: author.id,
                tag_ids: &[],
                is_read: false,
                importance: None,
            })
            .unwrap();

        let comment = db
            .create_comment(post.id, author.id, "first!")
            .unwrap()
            .unwrap();
        assert_eq!(db.find_comment(comment.id).unwrap().unwrap().content, "first!");

        assert!(db.delete_comment(comment.id).unwrap());
        assert!(db.find_comment(comment.id).unwrap().is_none());
        assert!(!db.delete_comment(comment.id).unwrap());
    }

    #[test]
    fn empty_content_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let author = db.create_user("author@example.com", Role::Member).unwrap();

        let result = db.create_comment(Uuid::new_v4(), author.id, "  ");
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[test]
    fn missing_post_reports_absence() {
        let db = Database::open_in_memory().unwrap();
        let author = db.create_user("author@example.com", Role::Member).unwrap();

        assert!(
            db.create_comment(Uuid::new_v4(), author.id, "hello")
                .unwrap()
                .is_none()
        );
    }
}
