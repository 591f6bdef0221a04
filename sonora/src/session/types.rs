use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::session::config::SESSION_RENEWAL_WINDOW;
use crate::userdb::User;

/// Server-side session record. `id` is the digest of the bearer token, never the token.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Where a session stands relative to a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    /// Inside the renewal window; the next validation extends it.
    NearExpiry,
    Expired,
}

impl Session {
    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        if now >= self.expires_at {
            SessionState::Expired
        } else if now >= self.expires_at - SESSION_RENEWAL_WINDOW {
            SessionState::NearExpiry
        } else {
            SessionState::Active
        }
    }
}

/// Outcome of validating a bearer token.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionValidation {
    Valid {
        session: Session,
        user: User,
        /// Whether this validation pushed the expiry forward.
        renewed: bool,
    },
    NotFound,
    /// The record had expired and has been removed.
    Expired,
}

impl SessionValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, SessionValidation::Valid { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::config::SESSION_LIFETIME;
    use chrono::TimeDelta;

    fn session_expiring_at(expires_at: DateTime<Utc>) -> Session {
        Session {
            id: "id".to_string(),
            user_id: "u".to_string(),
            expires_at,
            created_at: expires_at - SESSION_LIFETIME,
        }
    }

    #[test]
    fn test_state_boundaries() {
        let now = Utc::now();

        let fresh = session_expiring_at(now + SESSION_LIFETIME);
        assert_eq!(fresh.state_at(now), SessionState::Active);

        let just_outside_window =
            session_expiring_at(now + SESSION_RENEWAL_WINDOW + TimeDelta::seconds(1));
        assert_eq!(just_outside_window.state_at(now), SessionState::Active);

        let at_window_edge = session_expiring_at(now + SESSION_RENEWAL_WINDOW);
        assert_eq!(at_window_edge.state_at(now), SessionState::NearExpiry);

        let at_expiry = session_expiring_at(now);
        assert_eq!(at_expiry.state_at(now), SessionState::Expired);

        let long_gone = session_expiring_at(now - TimeDelta::days(1));
        assert_eq!(long_gone.state_at(now), SessionState::Expired);
    }
}
