pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Accepted `iss` values for Google ID tokens.
pub const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

pub const GOOGLE_SCOPES: [&str; 3] = ["openid", "profile", "email"];

pub const GOOGLE_STATE_COOKIE: &str = "google_oauth_state";
pub const GOOGLE_CODE_VERIFIER_COOKIE: &str = "google_code_verifier";

/// Lifetime of the state and verifier cookies, in seconds.
pub const OAUTH_COOKIE_MAX_AGE: i64 = 600;

/// Client registration for Google sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
}

impl GoogleOAuthConfig {
    /// Uses Google's public endpoints; override `auth_url`/`token_url` to point elsewhere.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
        }
    }
}
