use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::ceremony::CeremonyError;
use crate::storage::{CacheData, CacheStore};

use super::key::{CeremonyKind, SessionKey};

/// Ceremony session state stored between begin and finish with a fixed TTL
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn CacheStore>,
    ttl: u64,
}

impl SessionCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: u64) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Stores `state` as JSON, replacing any live session for the same pair
    pub async fn put<T: Serialize>(
        &self,
        kind: CeremonyKind,
        username: &str,
        state: &T,
    ) -> Result<(), CeremonyError> {
        let key = SessionKey::new(kind, username);
        let value = serde_json::to_string(state)
            .map_err(|e| CeremonyError::Unexpected(format!("Failed to encode session: {e}")))?;

        self.store
            .put_with_ttl(key.as_str(), CacheData { value }, self.ttl)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store session {}: {}", key, e);
                CeremonyError::Cache(e.to_string())
            })?;

        tracing::debug!("Stored {} session at {} (ttl {}s)", kind, key, self.ttl);
        Ok(())
    }

    /// Loads the live session; absence is [`CeremonyError::SessionNotFound`]
    pub async fn get<T: DeserializeOwned>(
        &self,
        kind: CeremonyKind,
        username: &str,
    ) -> Result<T, CeremonyError> {
        let key = SessionKey::new(kind, username);

        let data = self
            .store
            .get(key.as_str())
            .await
            .map_err(|e| {
                tracing::error!("Failed to read session {}: {}", key, e);
                CeremonyError::Cache(e.to_string())
            })?
            .ok_or_else(|| {
                tracing::debug!("No {} session for {}", kind, username);
                CeremonyError::SessionNotFound(key.to_string())
            })?;

        serde_json::from_str(&data.value).map_err(|e| {
            tracing::error!("Corrupt session state at {}: {}", key, e);
            CeremonyError::Decode(format!("Failed to decode session state: {e}"))
        })
    }

    pub async fn remove(&self, kind: CeremonyKind, username: &str) -> Result<(), CeremonyError> {
        let key = SessionKey::new(kind, username);
        self.store.remove(key.as_str()).await.map_err(|e| {
            tracing::error!("Failed to remove session {}: {}", key, e);
            CeremonyError::Cache(e.to_string())
        })?;
        tracing::debug!("Removed session {}", key);
        Ok(())
    }
}
