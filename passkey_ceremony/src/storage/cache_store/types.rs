use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

pub struct InMemoryCacheStore {
    pub(super) entry: Mutex<HashMap<String, (CacheData, DateTime<Utc>)>>,
}

pub struct RedisCacheStore {
    pub(super) client: redis::Client,
}

/// Short-lived key/value store holding ceremony state between begin and finish.
///
/// Keys are passed through verbatim; callers own the key format.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put a value into the store, replacing any existing entry, expiring after `ttl` seconds.
    async fn put_with_ttl(&self, key: &str, value: CacheData, ttl: u64)
    -> Result<(), StorageError>;

    /// Get a value from the store. Expired entries read as absent.
    async fn get(&self, key: &str) -> Result<Option<CacheData>, StorageError>;

    /// Remove a value from the store. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Remaining lifetime of an entry in seconds, or None if the key is absent.
    async fn ttl(&self, key: &str) -> Result<Option<i64>, StorageError>;
}
