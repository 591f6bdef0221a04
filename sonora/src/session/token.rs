use sha2::{Digest, Sha256};

use crate::session::errors::SessionError;
use crate::utils::{base64url_encode, random_bytes};

/// Number of random bytes behind each bearer token (192 bits).
const TOKEN_BYTES: usize = 24;

/// Issues a fresh opaque bearer token.
///
/// The token is only ever handed to the client; the server keeps its
/// [`session_id_from_token`] digest.
pub fn issue_token() -> Result<String, SessionError> {
    Ok(base64url_encode(&random_bytes(TOKEN_BYTES)?))
}

/// Lowercase hex SHA-256 of the token, used as the session record id.
pub fn session_id_from_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
