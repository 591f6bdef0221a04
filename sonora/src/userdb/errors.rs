use thiserror::Error;

use crate::storage::StorageError;

#[derive(Clone, Error, Debug, PartialEq)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("A user with this {0} already exists")]
    Duplicate(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<StorageError> for UserError {
    fn from(err: StorageError) -> Self {
        UserError::Storage(err.to_string())
    }
}

/// Maps a sqlx error, turning unique-constraint violations into [`UserError::Duplicate`].
pub(super) fn map_sqlx_error(err: sqlx::Error) -> UserError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let field = if db_err.message().contains("email") {
                "email"
            } else {
                "value"
            };
            return UserError::Duplicate(field.to_string());
        }
    }
    UserError::Storage(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_display_matches_user_message() {
        let err = UserError::Duplicate("email".to_string());
        assert_eq!(err.to_string(), "A user with this email already exists");
    }

    #[test]
    fn test_from_storage_error() {
        let err = UserError::from(StorageError::Storage("pool closed".to_string()));
        match err {
            UserError::Storage(msg) => assert!(msg.contains("pool closed")),
            other => panic!("Expected Storage variant, got {other:?}"),
        }
    }

    #[test]
    fn test_map_non_database_sqlx_error() {
        let err = map_sqlx_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, UserError::Storage(_)));
    }
}
