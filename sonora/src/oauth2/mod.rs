//! Google sign-in over OAuth 2.0 authorization code flow with PKCE.

mod config;
mod errors;
mod google;
mod idtoken;
mod provider;
mod types;

pub use config::{
    GOOGLE_AUTH_URL, GOOGLE_CODE_VERIFIER_COOKIE, GOOGLE_ISSUERS, GOOGLE_SCOPES,
    GOOGLE_STATE_COOKIE, GOOGLE_TOKEN_URL, GoogleOAuthConfig, OAUTH_COOKIE_MAX_AGE,
};
pub use errors::OAuth2Error;
pub use google::GoogleProvider;
pub use provider::{IdentityProvider, code_challenge, generate_code_verifier, generate_state};
pub use types::{IdTokenClaims, OidcTokens};
