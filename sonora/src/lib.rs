//! sonora - accounts, sessions and observability core for the sonora music platform
//!
//! This crate owns the session lifecycle (opaque bearer tokens, hashed server-side
//! records, sliding renewal), password and Google sign-in, the user and catalog stores,
//! and the Prometheus metrics collector. HTTP integration lives in `sonora-axum`.

mod catalog;
mod config;
mod coordination;
mod credential;
mod oauth2;
mod observability;
mod session;
mod storage;
mod userdb;
mod utils;

pub use catalog::{CatalogStats, CatalogStore};

pub use config::{AppConfig, ConfigError, DatabaseKind};

pub use coordination::{
    AuthOutcome, CoordinationError, GoogleIdentity, LoginForm, MIN_PASSWORD_LENGTH,
    ProfileUpdate, RegisterForm, complete_google_login, login_with_password,
    register_with_password, update_profile, validate_email,
};

pub use credential::{CredentialError, CredentialHasher};

pub use oauth2::{
    GOOGLE_AUTH_URL, GOOGLE_CODE_VERIFIER_COOKIE, GOOGLE_ISSUERS, GOOGLE_SCOPES,
    GOOGLE_STATE_COOKIE, GOOGLE_TOKEN_URL, GoogleOAuthConfig, GoogleProvider, IdTokenClaims,
    IdentityProvider, OAUTH_COOKIE_MAX_AGE, OAuth2Error, OidcTokens, code_challenge,
    generate_code_verifier, generate_state,
};

pub use observability::{
    CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL, CONTENT_TYPE as METRICS_CONTENT_TYPE,
    DB_QUERIES_TOTAL, DB_QUERY_DURATION_SECONDS, ERRORS_TOTAL, HTTP_REQUEST_DURATION_SECONDS,
    HTTP_REQUESTS_TOTAL, Metrics, MetricsError, PLAYLISTS_CREATED_TOTAL, SONGS_PLAYED_TOTAL,
    USER_ACTIONS_TOTAL,
};

pub use session::{
    SESSION_COOKIE_NAME, SESSION_LIFETIME, SESSION_RENEWAL_WINDOW, Session, SessionError,
    SessionManager, SessionState, SessionStore, SessionValidation, SqlSessionStore,
    clear_session_cookie, clear_session_cookie_header, get_session_token_from_headers,
    issue_token, session_cookie, session_id_from_token, set_session_cookie,
};

pub use storage::{DataStore, Database, StorageError};

pub use userdb::{NewUser, StoredUser, User, UserError, UserSearchField, UserStore, UserUpdate};

pub use utils::{UtilError, header_set_cookie};

/// Creates and validates every table, users first so the foreign keys resolve.
pub async fn init(db: &Database) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    UserStore::new(db.clone()).init().await?;
    SqlSessionStore::new(db.clone()).init().await?;
    CatalogStore::new(db.clone()).init().await?;
    Ok(())
}
