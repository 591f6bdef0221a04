use std::{str::FromStr, sync::Arc};

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{PgPool, Pool, Postgres, Sqlite, SqlitePool};

use crate::config::DatabaseKind;
use crate::storage::errors::StorageError;

/// A connection pool for one of the supported SQL backends.
///
/// Stores dispatch on whichever accessor returns `Some`.
pub trait DataStore: Send + Sync {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>>;
    fn as_postgres(&self) -> Option<&Pool<Postgres>>;
}

#[derive(Clone, Debug)]
enum SqlPool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

impl DataStore for SqlPool {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>> {
        match self {
            Self::Sqlite(pool) => Some(pool),
            Self::Postgres(_) => None,
        }
    }

    fn as_postgres(&self) -> Option<&Pool<Postgres>> {
        match self {
            Self::Postgres(pool) => Some(pool),
            Self::Sqlite(_) => None,
        }
    }
}

/// Builds a lazily connecting pool for `kind` at `url`.
pub(crate) fn connect_data_store(
    kind: DatabaseKind,
    url: &str,
) -> Result<Arc<dyn DataStore>, StorageError> {
    tracing::info!(?kind, "Initializing data store");

    let pool = match kind {
        DatabaseKind::Sqlite => {
            let opts = SqliteConnectOptions::from_str(url)
                .map_err(|e| StorageError::Storage(format!("Invalid SQLite URL: {e}")))?
                .create_if_missing(true)
                .foreign_keys(true);
            SqlPool::Sqlite(SqlitePoolOptions::new().connect_lazy_with(opts))
        }
        DatabaseKind::Postgres => SqlPool::Postgres(
            PgPoolOptions::new()
                .connect_lazy(url)
                .map_err(|e| StorageError::Storage(format!("Invalid Postgres URL: {e}")))?,
        ),
    };

    Ok(Arc::new(pool))
}

/// A private in-memory SQLite database.
///
/// The pool is pinned to a single connection that is never recycled; every connection to
/// `sqlite::memory:` would otherwise see its own empty database.
pub(crate) fn memory_data_store() -> Result<Arc<dyn DataStore>, StorageError> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| StorageError::Storage(e.to_string()))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_lazy_with(opts);

    Ok(Arc::new(SqlPool::Sqlite(pool)))
}
