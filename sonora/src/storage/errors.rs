use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Unsupported database type")]
    UnsupportedDatabase,
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        // Given a StorageError with a Storage variant
        let error = StorageError::Storage("Connection failed".to_string());

        // Then it should format with its prefix
        assert_eq!(error.to_string(), "Storage error: Connection failed");
    }

    #[test]
    fn test_from_sqlx_error() {
        // Given a sqlx error
        let sqlx_error = sqlx::Error::RowNotFound;

        // When converting to StorageError
        let storage_error = StorageError::from(sqlx_error);

        // Then it should be a Storage variant carrying the message
        match storage_error {
            StorageError::Storage(msg) => assert!(msg.contains("no rows")),
            other => panic!("Expected Storage variant, got {other:?}"),
        }
    }

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StorageError>();
    }
}
