use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::session::{errors::SessionError, types::Session};
use crate::storage::Database;
use crate::userdb::User;

use super::SessionStore;
use super::postgres::*;
use super::sqlite::*;

const SESSIONS: &str = "sessions";

/// A session row joined with its owner's public columns.
#[derive(Debug, FromRow)]
pub(super) struct SessionUserRow {
    session_id: String,
    session_expires_at: DateTime<Utc>,
    session_created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    user: User,
}

impl SessionUserRow {
    fn into_parts(self) -> (Session, User) {
        let session = Session {
            id: self.session_id,
            user_id: self.user.id.clone(),
            expires_at: self.session_expires_at,
            created_at: self.session_created_at,
        };
        (session, self.user)
    }
}

/// `SELECT ... FROM sessions s JOIN users u`, without the `WHERE` clause.
pub(super) fn join_select(sessions_table: &str, users_table: &str) -> String {
    format!(
        r#"
        SELECT
            s.id AS session_id, s.expires_at AS session_expires_at, s.created_at AS session_created_at,
            u.id, u.email, u.username, u.display_name, u.avatar_url, u.bio, u.wallet_address,
            u.is_verified, u.google_id, u.created_at, u.updated_at
        FROM {sessions_table} s
        JOIN {users_table} u ON u.id = s.user_id
        "#
    )
}

/// [`SessionStore`] backed by the relational database.
#[derive(Clone, Debug)]
pub struct SqlSessionStore {
    db: Database,
}

impl SqlSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn table_name(&self) -> String {
        self.db.table(SESSIONS)
    }

    /// Creates and validates the sessions table. The users table must exist first.
    pub async fn init(&self) -> Result<(), SessionError> {
        let table = self.table_name();
        let users = self.db.table("users");
        let store = self.db.store();

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool, &table, &users).await?;
                validate_session_tables_sqlite(pool, &table).await?;
                Ok(())
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool, &table, &users).await?;
                validate_session_tables_postgres(pool, &table).await?;
                Ok(())
            }
            _ => Err(SessionError::Storage("Unsupported database type".to_string())),
        }
    }
}

#[async_trait]
impl SessionStore for SqlSessionStore {
    async fn insert(&self, session: &Session) -> Result<(), SessionError> {
        let table = self.table_name();
        let store = self.db.store();

        self.db
            .observe("insert", SESSIONS, async {
                if let Some(pool) = store.as_sqlite() {
                    insert_session_sqlite(pool, &table, session).await
                } else if let Some(pool) = store.as_postgres() {
                    insert_session_postgres(pool, &table, session).await
                } else {
                    Err(SessionError::Storage("Unsupported database type".to_string()))
                }
            })
            .await
    }

    async fn find_by_id_join_user(
        &self,
        session_id: &str,
    ) -> Result<Option<(Session, User)>, SessionError> {
        let table = self.table_name();
        let users = self.db.table("users");
        let store = self.db.store();

        let row = self
            .db
            .observe("select", SESSIONS, async {
                if let Some(pool) = store.as_sqlite() {
                    find_session_sqlite(pool, &table, &users, session_id).await
                } else if let Some(pool) = store.as_postgres() {
                    find_session_postgres(pool, &table, &users, session_id).await
                } else {
                    Err(SessionError::Storage("Unsupported database type".to_string()))
                }
            })
            .await?;

        Ok(row.map(SessionUserRow::into_parts))
    }

    async fn update_expiry(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let table = self.table_name();
        let store = self.db.store();

        self.db
            .observe("update", SESSIONS, async {
                if let Some(pool) = store.as_sqlite() {
                    update_expiry_sqlite(pool, &table, session_id, expires_at).await
                } else if let Some(pool) = store.as_postgres() {
                    update_expiry_postgres(pool, &table, session_id, expires_at).await
                } else {
                    Err(SessionError::Storage("Unsupported database type".to_string()))
                }
            })
            .await
    }

    async fn delete(&self, session_id: &str) -> Result<(), SessionError> {
        let table = self.table_name();
        let store = self.db.store();

        self.db
            .observe("delete", SESSIONS, async {
                if let Some(pool) = store.as_sqlite() {
                    delete_session_sqlite(pool, &table, session_id).await
                } else if let Some(pool) = store.as_postgres() {
                    delete_session_postgres(pool, &table, session_id).await
                } else {
                    Err(SessionError::Storage("Unsupported database type".to_string()))
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::Metrics;
    use crate::session::config::SESSION_LIFETIME;
    use crate::userdb::{NewUser, UserStore};

    async fn setup() -> (UserStore, SqlSessionStore, User) {
        let db = Database::in_memory(Metrics::new().unwrap()).unwrap();
        let users = UserStore::new(db.clone());
        users.init().await.unwrap();
        let sessions = SqlSessionStore::new(db);
        sessions.init().await.unwrap();
        let user = users
            .create_user(NewUser {
                email: "owner@example.com".to_string(),
                ..NewUser::default()
            })
            .await
            .unwrap();
        (users, sessions, user)
    }

    fn session_for(user: &User, id: &str) -> Session {
        let now = Utc::now();
        Session {
            id: id.to_string(),
            user_id: user.id.clone(),
            expires_at: now + SESSION_LIFETIME,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_joins_owner() {
        let (_users, store, user) = setup().await;
        let session = session_for(&user, "s1");
        store.insert(&session).await.unwrap();

        let (found, owner) = store.find_by_id_join_user("s1").await.unwrap().unwrap();

        assert_eq!(found.id, "s1");
        assert_eq!(found.user_id, user.id);
        assert_eq!(found.expires_at.timestamp(), session.expires_at.timestamp());
        assert_eq!(owner.email, "owner@example.com");
    }

    #[tokio::test]
    async fn test_find_missing_is_none() {
        let (_users, store, _user) = setup().await;
        assert!(store.find_by_id_join_user("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_expiry() {
        let (_users, store, user) = setup().await;
        store.insert(&session_for(&user, "s1")).await.unwrap();
        let new_expiry = Utc::now() + chrono::TimeDelta::days(2);

        store.update_expiry("s1", new_expiry).await.unwrap();

        let (found, _) = store.find_by_id_join_user("s1").await.unwrap().unwrap();
        assert_eq!(found.expires_at.timestamp(), new_expiry.timestamp());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_users, store, user) = setup().await;
        store.insert(&session_for(&user, "s1")).await.unwrap();

        store.delete("s1").await.unwrap();
        store.delete("s1").await.unwrap();
        store.delete("never-existed").await.unwrap();

        assert!(store.find_by_id_join_user("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_to_sessions() {
        let (users, store, user) = setup().await;
        store.insert(&session_for(&user, "s1")).await.unwrap();

        users.delete_user(&user.id).await.unwrap();

        assert!(store.find_by_id_join_user("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_for_unknown_user_fails() {
        let (_users, store, user) = setup().await;
        let mut orphan = session_for(&user, "s1");
        orphan.user_id = "ghost".to_string();

        let result = store.insert(&orphan).await;

        assert!(matches!(result, Err(SessionError::Storage(_))));
    }
}
