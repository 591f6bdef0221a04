use thiserror::Error;

use crate::credential::CredentialError;
use crate::session::SessionError;
use crate::userdb::UserError;

/// Errors that can occur during account coordination
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinationError {
    /// Malformed user input; the message is safe to show to the user
    #[error("{0}")]
    Validation(String),

    /// Unknown account, password-less account or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// A store or hashing failure; surfaces as an internal error
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<UserError> for CoordinationError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Duplicate(_) => Self::Validation(err.to_string()),
            UserError::InvalidData(msg) => Self::Validation(msg),
            UserError::NotFound | UserError::Storage(_) => Self::Persistence(err.to_string()),
        }
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<CredentialError> for CoordinationError {
    fn from(err: CredentialError) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<CoordinationError>();
    }

    #[test]
    fn test_duplicate_user_becomes_user_facing_validation() {
        let err = CoordinationError::from(UserError::Duplicate("email".to_string()));
        assert_eq!(
            err,
            CoordinationError::Validation("A user with this email already exists".to_string())
        );
        assert_eq!(err.to_string(), "A user with this email already exists");
    }

    #[test]
    fn test_store_failures_are_persistence() {
        assert!(matches!(
            CoordinationError::from(UserError::Storage("disk full".to_string())),
            CoordinationError::Persistence(_)
        ));
        assert!(matches!(
            CoordinationError::from(SessionError::Storage("gone".to_string())),
            CoordinationError::Persistence(_)
        ));
        assert!(matches!(
            CoordinationError::from(CredentialError::Task("cancelled".to_string())),
            CoordinationError::Persistence(_)
        ));
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        assert_eq!(
            CoordinationError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }
}
