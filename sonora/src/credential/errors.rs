use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Random source failed: {0}")]
    Crypto(String),

    /// The blocking worker running the hash was cancelled or panicked.
    #[error("Hashing task failed: {0}")]
    Task(String),
}
