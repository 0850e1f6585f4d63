use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use echos_types::models::{Role, User};

use crate::error::is_unique_violation;
use crate::models::{UserRow, now, ts_text};
use crate::{Database, Result, StoreError};

impl Database {
    /// Provision a user row. The id is generated here: the store is the
    /// single source of truth for accounts and their roles.
    pub fn create_user(&self, email: &str, role: Role) -> Result<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(StoreError::Validation("email must not be empty".into()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role,
            created_at: now(),
        };

        self.with_write(|conn| {
            match conn.execute(
                "INSERT INTO users (id, email, role, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    user.id.to_string(),
                    user.email,
                    role.as_str(),
                    ts_text(user.created_at)
                ],
            ) {
                Ok(_) => Ok(()),
                Err(e) if is_unique_violation(&e) => Err(StoreError::Validation(format!(
                    "email already registered: {email}"
                ))),
                Err(e) => Err(e.into()),
            }
        })?;

        Ok(user)
    }

    pub fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        self.with_read(|conn| query_user_by_id(conn, id))
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.with_read(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, email, role, created_at FROM users ORDER BY email ASC")?;

            let rows = stmt
                .query_map([], user_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(UserRow::into_user).collect()
        })
    }

    /// Admin accounts are exempt from role changes, enforced here in the
    /// statement itself so the guard and the update cannot be separated.
    pub fn update_user_role(&self, id: Uuid, role: Role) -> Result<bool> {
        self.with_write(|conn| {
            let changed = conn.execute(
                "UPDATE users SET role = ?1 WHERE id = ?2 AND role != 'admin'",
                params![role.as_str(), id.to_string()],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete a user. Admin accounts are protected at this layer so no
    /// caller path can bypass the check. The user's own posts cascade
    /// away (taking their post_tags, likes and comments with them); the
    /// likes and comments this user left on other posts are left behind
    /// as orphans for readers to tolerate.
    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        self.with_write(|conn| {
            let tx = conn.transaction()?;

            let role: Option<String> = tx
                .query_row(
                    "SELECT role FROM users WHERE id = ?1",
                    [id.to_string()],
                    |r| r.get(0),
                )
                .optional()?;

            let deletable = match role.as_deref() {
                None => false,
                Some("admin") => false,
                Some(_) => true,
            };
            if !deletable {
                return Ok(false);
            }

            tx.execute("DELETE FROM users WHERE id = ?1", [id.to_string()])?;
            tx.commit()?;
            Ok(true)
        })
    }
}

pub(crate) fn query_user_by_id(conn: &Connection, id: Uuid) -> Result<Option<User>> {
    let mut stmt = conn.prepare("SELECT id, email, role, created_at FROM users WHERE id = ?1")?;

    let row = stmt.query_row([id.to_string()], user_row).optional()?;

    row.map(UserRow::into_user).transpose()
}

fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        role: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_accounts_present() {
        let db = Database::open_in_memory().unwrap();
        let users = db.list_users().unwrap();

        assert_eq!(users.len(), 3);
        // email ascending
        assert_eq!(users[0].email, "admin@echos.dev");
        assert_eq!(users[0].role, Role::Admin);
        assert_eq!(users[2].email, "member@echos.dev");
    }

    #[test]
    fn duplicate_email_is_rejected_case_insensitively() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("casey@example.com", Role::Member).unwrap();

        let err = db.create_user("CASEY@example.com", Role::Member);
        assert!(matches!(err, Err(StoreError::Validation(_))));
    }

    #[test]
    fn admin_accounts_cannot_be_deleted() {
        let db = Database::open_in_memory().unwrap();
        let admin = db.create_user("root@example.com", Role::Admin).unwrap();

        assert!(!db.delete_user(admin.id).unwrap());
        assert!(db.find_user(admin.id).unwrap().is_some());
    }

    #[test]
    fn deleting_unknown_user_returns_false() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.delete_user(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn admin_accounts_are_exempt_from_role_changes() {
        let db = Database::open_in_memory().unwrap();
        let admin = db.create_user("root@example.com", Role::Admin).unwrap();
        let member = db.create_user("casey@example.com", Role::Member).unwrap();

        assert!(!db.update_user_role(admin.id, Role::Member).unwrap());
        assert_eq!(db.find_user(admin.id).unwrap().unwrap().role, Role::Admin);

        assert!(db.update_user_role(member.id, Role::Leader).unwrap());
        assert_eq!(db.find_user(member.id).unwrap().unwrap().role, Role::Leader);
    }
}
