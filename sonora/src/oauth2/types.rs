use serde::{Deserialize, Serialize};

/// Token endpoint response for the authorization code grant.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct OidcTokenResponse {
    pub(super) access_token: String,
    pub(super) token_type: Option<String>,
    pub(super) expires_in: Option<u64>,
    pub(super) refresh_token: Option<String>,
    pub(super) scope: Option<String>,
    pub(super) id_token: Option<String>,
}

/// Tokens returned by a successful code exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct OidcTokens {
    pub access_token: String,
    pub id_token: String,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
}

/// Claims read from a Google ID token. `sub` and `email` are optional here so callers can
/// reject tokens that omit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub sub: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub exp: i64,
}
