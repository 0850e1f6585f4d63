use rusqlite::params;
use uuid::Uuid;

use echos_types::models::LikeState;

use crate::error::{is_fk_violation, is_unique_violation};
use crate::models::{now, ts_text};
use crate::{Database, Result};

impl Database {
    /// Flip the like state for (post, user) and report which transition
    /// fired. The write IS the state check: we insert first and let the
    /// `UNIQUE(post_id, user_id)` constraint tell us the like already
    /// existed, in which case the toggle is a delete. No separate
    /// existence read, so concurrent toggles can never double-insert.
    ///
    /// Returns `None` when the post does not exist (FK failure on insert).
    pub fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<LikeState>> {
        self.with_write(|conn| {
            let insert = conn.execute(
                "INSERT INTO likes (id, post_id, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    Uuid::new_v4().to_string(),
                    post_id.to_string(),
                    user_id.to_string(),
                    ts_text(now())
                ],
            );

            match insert {
                Ok(_) => Ok(Some(LikeState::Added)),
                Err(e) if is_unique_violation(&e) => {
                    conn.execute(
                        "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
                        params![post_id.to_string(), user_id.to_string()],
                    )?;
                    Ok(Some(LikeState::Removed))
                }
                Err(e) if is_fk_violation(&e) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn has_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.with_read(|conn| {
            let liked: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM likes WHERE post_id = ?1 AND user_id = ?2)",
                params![post_id.to_string(), user_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(liked)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewPost;
    use echos_types::models::Role;

    fn post_and_user(db: &Database) -> (Uuid, Uuid) {
        let author = db.create_user("author@example.com", Role::Member).unwrap();
        let reader = db.create_user("reader@example.com", Role::Member).unwrap();
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
        (post.id, reader.id)
    }

    #[test]
    fn toggle_alternates_strictly() {
        let db = Database::open_in_memory().unwrap();
        let (post_id, user_id) = post_and_user(&db);

        for _ in 0..3 {
            assert_eq!(
                db.toggle_like(post_id, user_id).unwrap(),
                Some(LikeState::Added)
            );
            assert!(db.has_liked(post_id, user_id).unwrap());

            assert_eq!(
                db.toggle_like(post_id, user_id).unwrap(),
                Some(LikeState::Removed)
            );
            assert!(!db.has_liked(post_id, user_id).unwrap());
        }
    }

    #[test]
    fn toggle_on_missing_post_reports_absence() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("reader@example.com", Role::Member).unwrap();

        assert_eq!(db.toggle_like(Uuid::new_v4(), user.id).unwrap(), None);
    }

    #[test]
    fn at_most_one_like_row_per_pair() {
        let db = Database::open_in_memory().unwrap();
        let (post_id, user_id) = post_and_user(&db);

        db.toggle_like(post_id, user_id).unwrap();
        db.toggle_like(post_id, user_id).unwrap();
        db.toggle_like(post_id, user_id).unwrap();

        let detail = db.find_post(post_id).unwrap().unwrap();
        assert_eq!(detail.likes.len(), 1);
        assert_eq!(detail.likes[0].like.user_id, user_id);
    }
}
