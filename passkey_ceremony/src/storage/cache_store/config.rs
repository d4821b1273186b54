use std::sync::Arc;

use crate::storage::errors::StorageError;

use super::types::{CacheStore, InMemoryCacheStore, RedisCacheStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStoreKind {
    Memory,
    Redis,
}

#[derive(Debug, Clone)]
pub struct CacheStoreConfig {
    pub kind: CacheStoreKind,
    pub url: String,
}

impl CacheStoreConfig {
    /// Builds the configured cache store and verifies it is reachable.
    pub async fn connect(&self) -> Result<Arc<dyn CacheStore>, StorageError> {
        tracing::info!("Initializing cache store with type: {:?}", self.kind);

        let store: Arc<dyn CacheStore> = match self.kind {
            CacheStoreKind::Memory => Arc::new(InMemoryCacheStore::new()),
            CacheStoreKind::Redis => Arc::new(RedisCacheStore::open(&self.url)?),
        };

        if let Err(e) = store.init().await {
            tracing::error!("Failed to connect to cache store: {}", e);
            return Err(e);
        }

        tracing::info!("Connected to cache store: type={:?}", self.kind);
        Ok(store)
    }
}
