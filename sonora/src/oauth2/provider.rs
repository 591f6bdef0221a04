use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::oauth2::{
    errors::OAuth2Error,
    types::{IdTokenClaims, OidcTokens},
};
use crate::utils::{base64url_encode, gen_random_string};

/// An OpenID Connect provider driving the authorization code flow.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL to redirect the browser to, carrying `state` and the S256 challenge of
    /// `code_verifier`.
    fn authorization_url(
        &self,
        state: &str,
        code_verifier: &str,
        scopes: &[&str],
    ) -> Result<String, OAuth2Error>;

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<OidcTokens, OAuth2Error>;

    fn decode_id_token(&self, id_token: &str) -> Result<IdTokenClaims, OAuth2Error>;
}

/// Random value bound to the browser through a cookie and echoed back by the provider.
pub fn generate_state() -> Result<String, OAuth2Error> {
    Ok(gen_random_string(32)?)
}

/// PKCE verifier: 32 random bytes, 43 base64url characters.
pub fn generate_code_verifier() -> Result<String, OAuth2Error> {
    Ok(gen_random_string(32)?)
}

/// S256 PKCE challenge for `code_verifier`.
pub fn code_challenge(code_verifier: &str) -> String {
    base64url_encode(&Sha256::digest(code_verifier.as_bytes()))
}
