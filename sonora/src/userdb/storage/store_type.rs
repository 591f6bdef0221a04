use chrono::Utc;

use crate::storage::Database;
use crate::userdb::{
    errors::UserError,
    types::{NewUser, StoredUser, User, UserSearchField, UserUpdate},
};

use super::postgres::*;
use super::sqlite::*;

const USERS: &str = "users";

/// Account persistence over the shared [`Database`].
#[derive(Clone, Debug)]
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn table_name(&self) -> String {
        self.db.table(USERS)
    }

    /// Initialize the user database tables
    pub async fn init(&self) -> Result<(), UserError> {
        let table = self.table_name();
        let store = self.db.store();

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool, &table).await?;
                validate_user_tables_sqlite(pool, &table).await?;
                Ok(())
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool, &table).await?;
                validate_user_tables_postgres(pool, &table).await?;
                Ok(())
            }
            _ => Err(UserError::Storage("Unsupported database type".to_string())),
        }
    }

    /// Inserts a new account with a fresh id, filling in username/display name defaults.
    #[tracing::instrument(skip(self, user), fields(email_domain = tracing::field::Empty))]
    pub async fn create_user(&self, mut user: NewUser) -> Result<User, UserError> {
        let now = Utc::now();
        user.email = user.email.trim().to_lowercase();
        if user.email.is_empty() {
            return Err(UserError::InvalidData("email must not be empty".to_string()));
        }
        let user = user.with_defaults(now);
        tracing::Span::current().record(
            "email_domain",
            user.email.split('@').nth(1).unwrap_or_default(),
        );

        let id = uuid::Uuid::new_v4().to_string();
        let table = self.table_name();
        let store = self.db.store();

        let created = self
            .db
            .observe("insert", USERS, async {
                if let Some(pool) = store.as_sqlite() {
                    insert_user_sqlite(pool, &table, &id, &user, now).await
                } else if let Some(pool) = store.as_postgres() {
                    insert_user_postgres(pool, &table, &id, &user, now).await
                } else {
                    Err(UserError::Storage("Unsupported database type".to_string()))
                }
            })
            .await?;

        tracing::info!(user_id = %created.id, "User created");
        Ok(created)
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, UserError> {
        self.get_user_by(UserSearchField::Id(id.to_string())).await
    }

    /// Looks a user up by a single unique-ish field. Email lookups are case-insensitive.
    #[tracing::instrument(skip(self, field), fields(field = %field))]
    pub async fn get_user_by(&self, field: UserSearchField) -> Result<Option<User>, UserError> {
        let field = match field {
            UserSearchField::Email(email) => UserSearchField::Email(email.trim().to_lowercase()),
            other => other,
        };
        let table = self.table_name();
        let store = self.db.store();

        let user = self
            .db
            .observe("select", USERS, async {
                if let Some(pool) = store.as_sqlite() {
                    get_user_by_field_sqlite(pool, &table, &field).await
                } else if let Some(pool) = store.as_postgres() {
                    get_user_by_field_postgres(pool, &table, &field).await
                } else {
                    Err(UserError::Storage("Unsupported database type".to_string()))
                }
            })
            .await?;

        tracing::debug!(found = user.is_some(), "User lookup completed");
        Ok(user)
    }

    /// Fetches the account together with its password hash. Only the password login path
    /// should call this.
    pub async fn get_stored_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredUser>, UserError> {
        let email = email.trim().to_lowercase();
        let table = self.table_name();
        let store = self.db.store();

        self.db
            .observe("select", USERS, async {
                if let Some(pool) = store.as_sqlite() {
                    get_stored_user_by_email_sqlite(pool, &table, &email).await
                } else if let Some(pool) = store.as_postgres() {
                    get_stored_user_by_email_postgres(pool, &table, &email).await
                } else {
                    Err(UserError::Storage("Unsupported database type".to_string()))
                }
            })
            .await
    }

    /// Applies a partial update. Returns `None` when no user has this id.
    #[tracing::instrument(skip(self, update), fields(fields = ?update.field_names()))]
    pub async fn update_user(
        &self,
        id: &str,
        update: UserUpdate,
    ) -> Result<Option<User>, UserError> {
        let mut update = update;
        if let Some(email) = update.email.take() {
            update.email = Some(email.trim().to_lowercase());
        }
        let now = Utc::now();
        let table = self.table_name();
        let store = self.db.store();

        self.db
            .observe("update", USERS, async {
                if let Some(pool) = store.as_sqlite() {
                    update_user_sqlite(pool, &table, id, &update, now).await
                } else if let Some(pool) = store.as_postgres() {
                    update_user_postgres(pool, &table, id, &update, now).await
                } else {
                    Err(UserError::Storage("Unsupported database type".to_string()))
                }
            })
            .await
    }

    /// Removes the account; its sessions go with it through the foreign key.
    pub async fn delete_user(&self, id: &str) -> Result<(), UserError> {
        let table = self.table_name();
        let store = self.db.store();

        let deleted = self
            .db
            .observe("delete", USERS, async {
                if let Some(pool) = store.as_sqlite() {
                    delete_user_sqlite(pool, &table, id).await
                } else if let Some(pool) = store.as_postgres() {
                    delete_user_postgres(pool, &table, id).await
                } else {
                    Err(UserError::Storage("Unsupported database type".to_string()))
                }
            })
            .await?;

        if deleted {
            Ok(())
        } else {
            Err(UserError::NotFound)
        }
    }

    pub async fn count_users(&self) -> Result<i64, UserError> {
        let table = self.table_name();
        let store = self.db.store();

        self.db
            .observe("select", USERS, async {
                if let Some(pool) = store.as_sqlite() {
                    count_users_sqlite(pool, &table).await
                } else if let Some(pool) = store.as_postgres() {
                    count_users_postgres(pool, &table).await
                } else {
                    Err(UserError::Storage("Unsupported database type".to_string()))
                }
            })
            .await
    }
}
