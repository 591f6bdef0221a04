use serde::Serialize;

use crate::storage::{Database, StorageError};

use super::schema::{CATALOG_TABLES, Dialect, create_statements};

/// Aggregate counts shown by the database health check.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_users: i64,
    pub total_artists: i64,
    pub total_tracks: i64,
    pub active_artists: i64,
    pub published_tracks: i64,
}

#[derive(Clone, Debug)]
pub struct CatalogStore {
    db: Database,
}

impl CatalogStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates the catalog tables. Must run after the user store is initialized.
    pub async fn init(&self) -> Result<(), StorageError> {
        let store = self.db.store();

        if let Some(pool) = store.as_sqlite() {
            for statement in create_statements(&self.db, Dialect::Sqlite) {
                sqlx::query(&statement).execute(pool).await?;
            }
        } else if let Some(pool) = store.as_postgres() {
            for statement in create_statements(&self.db, Dialect::Postgres) {
                sqlx::query(&statement).execute(pool).await?;
            }
        } else {
            return Err(StorageError::UnsupportedDatabase);
        }

        tracing::info!(tables = CATALOG_TABLES.len(), "Catalog tables ready");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), StorageError> {
        self.db.ping().await
    }

    pub async fn statistics(&self) -> Result<CatalogStats, StorageError> {
        Ok(CatalogStats {
            total_users: self.count("users", None).await?,
            total_artists: self.count("artists", None).await?,
            total_tracks: self.count("tracks", None).await?,
            active_artists: self.count("artists", Some("is_active")).await?,
            published_tracks: self.count("tracks", Some("is_published")).await?,
        })
    }

    /// `SELECT COUNT(*)` over `table`, optionally restricted to rows where the boolean
    /// column `flag` is true.
    async fn count(&self, table: &str, flag: Option<&str>) -> Result<i64, StorageError> {
        let physical = self.db.table(table);
        let sql = match flag {
            Some(column) => format!("SELECT COUNT(*) FROM {physical} WHERE {column} = TRUE"),
            None => format!("SELECT COUNT(*) FROM {physical}"),
        };
        let store = self.db.store();

        self.db
            .observe("select", table, async {
                if let Some(pool) = store.as_sqlite() {
                    Ok::<_, StorageError>(sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await?)
                } else if let Some(pool) = store.as_postgres() {
                    Ok::<_, StorageError>(sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await?)
                } else {
                    Err(StorageError::UnsupportedDatabase)
                }
            })
            .await
    }
}
