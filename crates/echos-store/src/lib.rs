pub mod comments;
pub mod error;
pub mod likes;
pub mod migrations;
pub mod models;
pub mod posts;
pub mod tags;
pub mod users;

pub use error::{Result, StoreError};
pub use posts::NewPost;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

/// Handle to the content store. One writer connection behind a mutex;
/// WAL mode keeps concurrent readers from blocking on it at the SQLite
/// level, and the mutex serializes every multi-step mutation.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        info!("Content store opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests and throwaway tooling.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn with_read<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Storage(format!("connection lock poisoned: {e}")))?;
        f(&conn)
    }

    /// Hands out `&mut Connection` so callers can open a real transaction
    /// around multi-step mutations.
    pub(crate) fn with_write<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Storage(format!("connection lock poisoned: {e}")))?;
        f(&mut conn)
    }
}
