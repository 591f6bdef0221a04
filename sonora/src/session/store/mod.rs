mod postgres;
mod sql;
mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::session::{errors::SessionError, types::Session};
use crate::userdb::User;

pub use sql::SqlSessionStore;

/// Persistence boundary for session records.
///
/// Every method reports backend failures as [`SessionError::Storage`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: &Session) -> Result<(), SessionError>;

    /// Loads the session and its owner in one round trip.
    async fn find_by_id_join_user(
        &self,
        session_id: &str,
    ) -> Result<Option<(Session, User)>, SessionError>;

    async fn update_expiry(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), SessionError>;

    /// Removing an id that does not exist is not an error.
    async fn delete(&self, session_id: &str) -> Result<(), SessionError>;
}
