use async_trait::async_trait;

use crate::credential::types::{CredentialRecord, Identity};
use crate::storage::{DataStore, StorageError};

use super::postgres::*;
use super::sqlite::*;

/// Durable username → credential mapping
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Creates the backing table if missing
    async fn init(&self) -> Result<(), StorageError>;

    /// Inserts an identity with no credential
    async fn create_identity(&self, username: &str) -> Result<Identity, StorageError>;

    async fn get_identity(&self, username: &str) -> Result<Option<Identity>, StorageError>;

    /// Writes the webauthn columns for `username`. Returns false when no identity matched.
    async fn save_credential(
        &self,
        username: &str,
        record: &CredentialRecord,
    ) -> Result<bool, StorageError>;

    /// Returns false when no identity matched
    async fn update_sign_count(
        &self,
        username: &str,
        sign_count: u32,
    ) -> Result<bool, StorageError>;
}

/// Credential store over a SQLite or PostgreSQL pool
pub struct SqlCredentialStore {
    store: Box<dyn DataStore>,
    table: String,
}

impl SqlCredentialStore {
    pub fn new(store: Box<dyn DataStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

fn unsupported() -> StorageError {
    StorageError::Storage("Unsupported database type".to_string())
}

#[async_trait]
impl CredentialStore for SqlCredentialStore {
    async fn init(&self) -> Result<(), StorageError> {
        let table = self.table.as_str();

        match (self.store.as_sqlite(), self.store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool, table).await?;
                validate_tables_sqlite(pool, table).await?;
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool, table).await?;
                validate_tables_postgres(pool, table).await?;
            }
            _ => return Err(unsupported()),
        }

        tracing::info!("Credential table '{}' ready", table);
        Ok(())
    }

    async fn create_identity(&self, username: &str) -> Result<Identity, StorageError> {
        let identity = Identity::new(username);

        if let Some(pool) = self.store.as_sqlite() {
            insert_identity_sqlite(pool, &self.table, &identity).await?;
        } else if let Some(pool) = self.store.as_postgres() {
            insert_identity_postgres(pool, &self.table, &identity).await?;
        } else {
            return Err(unsupported());
        }

        tracing::debug!("Created identity {} for {}", identity.id, username);
        Ok(identity)
    }

    async fn get_identity(&self, username: &str) -> Result<Option<Identity>, StorageError> {
        if let Some(pool) = self.store.as_sqlite() {
            get_identity_sqlite(pool, &self.table, username).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_identity_postgres(pool, &self.table, username).await
        } else {
            Err(unsupported())
        }
    }

    async fn save_credential(
        &self,
        username: &str,
        record: &CredentialRecord,
    ) -> Result<bool, StorageError> {
        if let Some(pool) = self.store.as_sqlite() {
            save_credential_sqlite(pool, &self.table, username, record).await
        } else if let Some(pool) = self.store.as_postgres() {
            save_credential_postgres(pool, &self.table, username, record).await
        } else {
            Err(unsupported())
        }
    }

    async fn update_sign_count(
        &self,
        username: &str,
        sign_count: u32,
    ) -> Result<bool, StorageError> {
        if let Some(pool) = self.store.as_sqlite() {
            update_sign_count_sqlite(pool, &self.table, username, sign_count).await
        } else if let Some(pool) = self.store.as_postgres() {
            update_sign_count_postgres(pool, &self.table, username, sign_count).await
        } else {
            Err(unsupported())
        }
    }
}
