//! Session lifecycle: opaque bearer tokens, their hashed server-side records, sliding
//! renewal, and the cookie that carries the token.

mod config;
mod cookie;
mod errors;
mod manager;
mod store;
mod token;
mod types;

pub use config::{SESSION_COOKIE_NAME, SESSION_LIFETIME, SESSION_RENEWAL_WINDOW};
pub use cookie::{
    clear_session_cookie, clear_session_cookie_header, get_session_token_from_headers,
    session_cookie, set_session_cookie,
};
pub use errors::SessionError;
pub use manager::SessionManager;
pub use store::{SessionStore, SqlSessionStore};
pub use token::{issue_token, session_id_from_token};
pub use types::{Session, SessionState, SessionValidation};
