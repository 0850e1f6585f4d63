use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Store failure taxonomy. Expected absence is never an error: lookups
/// return `Option`/`bool` instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed input: empty required field, bad color format,
    /// unresolvable foreign key, duplicate unique value.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Underlying persistence fault. Transient; callers may retry.
    #[error("storage fault: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

/// A UNIQUE or PRIMARY KEY constraint rejected the statement.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// A FOREIGN KEY constraint rejected the statement.
pub(crate) fn is_fk_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}
