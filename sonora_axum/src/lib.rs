//! sonora-axum - HTTP surface for the sonora accounts core
//!
//! [`app_router`] mounts the login, registration, Google sign-in, profile and health
//! routes behind two middleware layers: [`resolve_identity`] turns the session cookie into a
//! [`RequestContext`], and [`log_and_measure`] logs every request and records the HTTP
//! metrics.

mod auth;
mod config;
mod error;
mod health;
mod middleware;
mod oauth2;
mod profile;
mod router;
mod session;
mod state;

#[cfg(test)]
mod test_utils;

pub use config::{OAUTH_ERROR_REDIRECT, REDIRECT_ANON, REDIRECT_USER};
pub use error::{AppError, HandlerFailure};
pub use middleware::{REQUEST_ID_HEADER, log_and_measure, resolve_identity, route_label};
pub use router::app_router;
pub use session::{AuthUser, RequestContext};
pub use state::AppState;
