use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::storage::validate_sqlite_table_schema;
use crate::userdb::{
    errors::{UserError, map_sqlx_error},
    types::{NewUser, StoredUser, User, UserSearchField, UserUpdate},
};

use super::USER_COLUMNS;

pub(super) async fn create_tables_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
) -> Result<(), UserError> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id TEXT PRIMARY KEY NOT NULL,
            email TEXT NOT NULL UNIQUE,
            username TEXT,
            display_name TEXT,
            avatar_url TEXT,
            bio TEXT,
            wallet_address TEXT,
            is_verified BOOLEAN NOT NULL DEFAULT false,
            google_id TEXT,
            hashed_password TEXT,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table_name}_google_id ON {table_name}(google_id)"
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn validate_user_tables_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
) -> Result<(), UserError> {
    let expected_columns = [
        ("id", "TEXT"),
        ("email", "TEXT"),
        ("username", "TEXT"),
        ("display_name", "TEXT"),
        ("avatar_url", "TEXT"),
        ("bio", "TEXT"),
        ("wallet_address", "TEXT"),
        ("is_verified", "BOOLEAN"),
        ("google_id", "TEXT"),
        ("hashed_password", "TEXT"),
        ("created_at", "TIMESTAMP"),
        ("updated_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(pool, table_name, &expected_columns, UserError::Storage).await
}

pub(super) async fn insert_user_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    id: &str,
    user: &NewUser,
    now: DateTime<Utc>,
) -> Result<User, UserError> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name}
            (id, email, username, display_name, avatar_url, google_id, hashed_password, is_verified, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, false, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.display_name)
    .bind(&user.avatar_url)
    .bind(&user.google_id)
    .bind(&user.hashed_password)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(map_sqlx_error)
}

pub(super) async fn get_user_by_field_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    field: &UserSearchField,
) -> Result<Option<User>, UserError> {
    let column = field.column();
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM {table_name} WHERE {column} = ?"
    ))
    .bind(field.value())
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn get_stored_user_by_email_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    email: &str,
) -> Result<Option<StoredUser>, UserError> {
    sqlx::query_as::<_, StoredUser>(&format!(
        "SELECT {USER_COLUMNS}, hashed_password FROM {table_name} WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn update_user_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    id: &str,
    update: &UserUpdate,
    now: DateTime<Utc>,
) -> Result<Option<User>, UserError> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE {table_name} SET
            username = COALESCE(?, username),
            email = COALESCE(?, email),
            display_name = COALESCE(?, display_name),
            avatar_url = COALESCE(?, avatar_url),
            bio = COALESCE(?, bio),
            updated_at = ?
        WHERE id = ?
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&update.username)
    .bind(&update.email)
    .bind(&update.display_name)
    .bind(&update.avatar_url)
    .bind(&update.bio)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(map_sqlx_error)
}

pub(super) async fn delete_user_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    id: &str,
) -> Result<bool, UserError> {
    let result = sqlx::query(&format!("DELETE FROM {table_name} WHERE id = ?"))
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn count_users_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
) -> Result<i64, UserError> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table_name}"))
        .fetch_one(pool)
        .await
        .map_err(|e| UserError::Storage(e.to_string()))
}
