use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::credential::types::{CredentialRecord, Identity};
use crate::storage::StorageError;

use super::store_type::CredentialStore;

/// Process-local credential store for tests and the memory demo
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    identities: RwLock<HashMap<String, Identity>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory credential store");
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn create_identity(&self, username: &str) -> Result<Identity, StorageError> {
        let mut identities = self.identities.write().await;
        if identities.contains_key(username) {
            return Err(StorageError::Storage(format!(
                "Identity '{username}' already exists"
            )));
        }
        let identity = Identity::new(username);
        identities.insert(username.to_string(), identity.clone());
        Ok(identity)
    }

    async fn get_identity(&self, username: &str) -> Result<Option<Identity>, StorageError> {
        Ok(self.identities.read().await.get(username).cloned())
    }

    async fn save_credential(
        &self,
        username: &str,
        record: &CredentialRecord,
    ) -> Result<bool, StorageError> {
        match self.identities.write().await.get_mut(username) {
            Some(identity) => {
                identity.apply(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_sign_count(
        &self,
        username: &str,
        sign_count: u32,
    ) -> Result<bool, StorageError> {
        match self.identities.write().await.get_mut(username) {
            Some(identity) => {
                identity.webauthn_sign_count = sign_count;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
