use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    /// The session store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The system entropy source failed; callers treat this as fatal.
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),
}

impl From<sqlx::Error> for SessionError {
    fn from(err: sqlx::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<UtilError> for SessionError {
    fn from(err: UtilError) -> Self {
        match err {
            UtilError::Crypto(msg) => SessionError::Crypto(msg),
            UtilError::Cookie(msg) => SessionError::Cookie(msg),
        }
    }
}
