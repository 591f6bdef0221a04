use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::session::{errors::SessionError, types::Session};
use crate::storage::validate_postgres_table_schema;

use super::sql::{SessionUserRow, join_select};

pub(super) async fn create_tables_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
    users_table: &str,
) -> Result<(), SessionError> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL REFERENCES {users_table}(id) ON DELETE CASCADE,
            expires_at TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table_name}_user_id ON {table_name}(user_id)"
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn validate_session_tables_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
) -> Result<(), SessionError> {
    let expected_columns = [
        ("id", "text"),
        ("user_id", "text"),
        ("expires_at", "timestamp with time zone"),
        ("created_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(pool, table_name, &expected_columns, SessionError::Storage)
        .await
}

pub(super) async fn insert_session_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
    session: &Session,
) -> Result<(), SessionError> {
    sqlx::query(&format!(
        "INSERT INTO {table_name} (id, user_id, expires_at, created_at) VALUES ($1, $2, $3, $4)"
    ))
    .bind(&session.id)
    .bind(&session.user_id)
    .bind(session.expires_at)
    .bind(session.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn find_session_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
    users_table: &str,
    session_id: &str,
) -> Result<Option<SessionUserRow>, SessionError> {
    let select = join_select(table_name, users_table);
    Ok(sqlx::query_as::<_, SessionUserRow>(&format!("{select} WHERE s.id = $1"))
        .bind(session_id)
        .fetch_optional(pool)
        .await?)
}

pub(super) async fn update_expiry_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
    session_id: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), SessionError> {
    sqlx::query(&format!("UPDATE {table_name} SET expires_at = $1 WHERE id = $2"))
        .bind(expires_at)
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub(super) async fn delete_session_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
    session_id: &str,
) -> Result<(), SessionError> {
    sqlx::query(&format!("DELETE FROM {table_name} WHERE id = $1"))
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(())
}
