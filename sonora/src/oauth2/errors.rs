use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OAuth2Error {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Invalid provider configuration: {0}")]
    Config(String),

    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    #[error("Id token error: {0}")]
    IdToken(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
