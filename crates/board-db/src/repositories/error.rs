//! sqlx error translation

use board_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Any store failure becomes `DatabaseError`; the cause text stays for logs
pub fn map_db_error(e: SqlxError) -> DomainError {
    match e {
        SqlxError::PoolTimedOut => DomainError::DatabaseError("connection pool exhausted".into()),
        other => DomainError::DatabaseError(other.to_string()),
    }
}

/// Like [`map_db_error`], except a unique-key violation becomes `on_unique()`
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    let is_unique = e
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());
    if is_unique {
        on_unique()
    } else {
        map_db_error(e)
    }
}
