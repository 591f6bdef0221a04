use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::session::{
    config::SESSION_LIFETIME,
    errors::SessionError,
    store::SessionStore,
    token::{issue_token, session_id_from_token},
    types::{Session, SessionState, SessionValidation},
};

/// Drives the session lifecycle against an injected [`SessionStore`].
///
/// Holds no session state of its own; concurrent renewals of the same record are
/// last-write-wins in the store.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn issue_token(&self) -> Result<String, SessionError> {
        issue_token()
    }

    /// Persists a new session for `user_id` keyed by the digest of `token`.
    #[tracing::instrument(skip(self, token))]
    pub async fn create_session(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Session, SessionError> {
        let now = Utc::now();
        let session = Session {
            id: session_id_from_token(token),
            user_id: user_id.to_string(),
            expires_at: now + SESSION_LIFETIME,
            created_at: now,
        };

        self.store.insert(&session).await?;

        tracing::info!(
            session_id = %session.id,
            expires_at = %session.expires_at,
            "Session created"
        );
        Ok(session)
    }

    /// Issues a token and creates its session in one step.
    pub async fn start_session(&self, user_id: &str) -> Result<(String, Session), SessionError> {
        let token = self.issue_token()?;
        let session = self.create_session(&token, user_id).await?;
        Ok((token, session))
    }

    /// Resolves a bearer token, deleting it when expired and renewing it when it is inside
    /// the renewal window.
    pub async fn validate_token(&self, token: &str) -> Result<SessionValidation, SessionError> {
        self.validate_at(token, Utc::now()).await
    }

    pub(crate) async fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionValidation, SessionError> {
        let session_id = session_id_from_token(token);

        let Some((mut session, user)) = self.store.find_by_id_join_user(&session_id).await? else {
            tracing::debug!(%session_id, "Session not found");
            return Ok(SessionValidation::NotFound);
        };

        match session.state_at(now) {
            SessionState::Expired => {
                self.store.delete(&session_id).await?;
                tracing::info!(
                    %session_id,
                    user_id = %session.user_id,
                    expired_at = %session.expires_at,
                    "Expired session removed"
                );
                Ok(SessionValidation::Expired)
            }
            SessionState::NearExpiry => {
                let expires_at = now + SESSION_LIFETIME;
                self.store.update_expiry(&session_id, expires_at).await?;
                session.expires_at = expires_at;
                tracing::debug!(%session_id, %expires_at, "Session renewed");
                Ok(SessionValidation::Valid {
                    session,
                    user,
                    renewed: true,
                })
            }
            SessionState::Active => Ok(SessionValidation::Valid {
                session,
                user,
                renewed: false,
            }),
        }
    }

    /// Deletes the session unconditionally. Invalidating an unknown id succeeds.
    pub async fn invalidate_session(&self, session_id: &str) -> Result<(), SessionError> {
        self.store.delete(session_id).await?;
        tracing::info!(%session_id, "Session invalidated");
        Ok(())
    }
}
