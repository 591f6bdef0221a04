use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::observability::Metrics;

use super::data_store::{DataStore, connect_data_store, memory_data_store};
use super::errors::StorageError;

/// Shared handle to the relational store.
///
/// Cloning is cheap; every store in the crate is built from one of these so that they share
/// the pool, the table prefix and the metrics registry.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn DataStore>,
    prefix: Arc<str>,
    metrics: Metrics,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl Database {
    pub fn connect(config: &AppConfig, metrics: Metrics) -> Result<Self, StorageError> {
        Ok(Self {
            store: connect_data_store(config.database_kind, &config.database_url)?,
            prefix: Arc::from(config.table_prefix.as_str()),
            metrics,
        })
    }

    /// Private in-memory SQLite database, used by tests and local experiments.
    pub fn in_memory(metrics: Metrics) -> Result<Self, StorageError> {
        Ok(Self {
            store: memory_data_store()?,
            prefix: Arc::from(crate::config::DEFAULT_TABLE_PREFIX),
            metrics,
        })
    }

    pub fn store(&self) -> &dyn DataStore {
        self.store.as_ref()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Physical table name for a logical one, e.g. `users` → `sonora_users`.
    pub fn table(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Runs `query`, recording its outcome and latency under `operation`/`table`.
    pub(crate) async fn observe<T, E, F>(
        &self,
        operation: &str,
        table: &str,
        query: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let start = Instant::now();
        let result = query.await;
        self.metrics
            .record_db_query(operation, table, start.elapsed(), result.is_ok());
        result
    }

    /// Round-trips a trivial query to prove the store is reachable.
    pub async fn ping(&self) -> Result<(), StorageError> {
        self.observe("select", "ping", async {
            if let Some(pool) = self.store.as_sqlite() {
                sqlx::query("SELECT 1").execute(pool).await?;
            } else if let Some(pool) = self.store.as_postgres() {
                sqlx::query("SELECT 1").execute(pool).await?;
            } else {
                return Err(StorageError::UnsupportedDatabase);
            }
            Ok::<(), StorageError>(())
        })
        .await
    }
}
