use std::str::FromStr;

use crate::storage::errors::StorageError;

use super::types::{DataStore, PostgresDataStore, SqliteDataStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataStoreKind {
    Sqlite,
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct DataStoreConfig {
    pub kind: DataStoreKind,
    pub url: String,
    pub table_prefix: String,
}

impl DataStoreConfig {
    /// Name of the identity table holding the webauthn columns
    pub fn users_table(&self) -> String {
        format!("{}users", self.table_prefix)
    }

    /// Opens a lazily connecting pool for SQL backends. Returns None for the memory kind.
    pub fn connect(&self) -> Result<Option<Box<dyn DataStore>>, StorageError> {
        tracing::info!("Initializing data store with type: {:?}", self.kind);

        let store: Box<dyn DataStore> = match self.kind {
            DataStoreKind::Sqlite => {
                let opts = sqlx::sqlite::SqliteConnectOptions::from_str(&self.url)?
                    .create_if_missing(true);
                // Each connection to an in-memory database sees its own database
                let pool_options = if self.url.contains(":memory:") {
                    sqlx::sqlite::SqlitePoolOptions::new()
                        .max_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None)
                } else {
                    sqlx::sqlite::SqlitePoolOptions::new()
                };
                Box::new(SqliteDataStore {
                    pool: pool_options.connect_lazy_with(opts),
                })
            }
            DataStoreKind::Postgres => Box::new(PostgresDataStore {
                pool: sqlx::PgPool::connect_lazy(&self.url)?,
            }),
            DataStoreKind::Memory => return Ok(None),
        };

        tracing::info!("Connected to database: type={:?}", self.kind);
        Ok(Some(store))
    }
}
