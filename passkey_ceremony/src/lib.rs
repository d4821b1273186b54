//! passkey_ceremony - WebAuthn ceremony orchestration
//!
//! This crate turns the two-step WebAuthn registration and login ceremonies
//! into consistent server-side state transitions. A [`CeremonyOrchestrator`]
//! drives a [`ProtocolEngine`], keeps in-flight challenge state in a
//! [`SessionCache`] and persists credentials through a [`CredentialStore`].

mod ceremony;
mod config;
mod credential;
mod engine;
mod session_cache;
mod storage;
mod utils;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

pub use ceremony::{
    BackupEligibilityPolicy, BeginLoginRequest, BeginRegistrationRequest, CeremonyError,
    CeremonyOrchestrator, CeremonyPolicy, ErrorKind, FinishLoginRequest,
    FinishRegistrationRequest, VerifiedUser,
};
pub use config::{CeremonyConfig, ConfigError, DEFAULT_SESSION_TTL};
pub use credential::{
    CredentialRecord, CredentialStore, Identity, InMemoryCredentialStore, SqlCredentialStore,
    StoredCredential,
};
pub use engine::{
    AssertionChallenge, AuthenticatorAssertionResponse, AuthenticatorAttestationResponse,
    AuthenticatorResponse, AuthenticatorSelection, CeremonySession, CeremonyUser,
    CreationChallenge, Credential, CredentialDescriptor, EngineConfig, EngineError,
    ProtocolEngine, PubKeyCredParam, PublicKeyCredentialCreationOptions,
    PublicKeyCredentialRequestOptions, RegisterCredential, RelyingParty, UserEntity,
    UserVerification, WebAuthnEngine,
};
pub use session_cache::{CeremonyKind, SessionCache, SessionKey};
pub use storage::{
    CacheData, CacheStore, CacheStoreConfig, CacheStoreKind, DataStore, DataStoreConfig,
    DataStoreKind, InMemoryCacheStore, PostgresDataStore, RedisCacheStore, SqliteDataStore,
    StorageError,
};
pub use utils::{UtilError, base64url_decode, base64url_encode};

/// Builds a ready orchestrator from environment variables
pub async fn init() -> Result<CeremonyOrchestrator, CeremonyError> {
    let config = CeremonyConfig::from_env()?;
    init_with_config(&config).await
}

/// Connects both stores, creates the credential table and wires the native engine
pub async fn init_with_config(
    config: &CeremonyConfig,
) -> Result<CeremonyOrchestrator, CeremonyError> {
    let cache = config
        .cache_store
        .connect()
        .await
        .map_err(|e| CeremonyError::Cache(e.to_string()))?;

    let credentials: Arc<dyn CredentialStore> = match config
        .data_store
        .connect()
        .map_err(|e| CeremonyError::Store(e.to_string()))?
    {
        Some(store) => Arc::new(SqlCredentialStore::new(
            store,
            config.data_store.users_table(),
        )),
        None => Arc::new(InMemoryCredentialStore::new()),
    };
    credentials
        .init()
        .await
        .map_err(|e| CeremonyError::Store(e.to_string()))?;

    let engine = Arc::new(WebAuthnEngine::new(config.engine.clone()));

    tracing::info!(
        "Ceremony orchestrator ready (session ttl {}s, policy {:?})",
        config.session_ttl,
        config.policy
    );

    Ok(CeremonyOrchestrator::new(
        engine,
        credentials,
        SessionCache::new(cache, config.session_ttl),
        config.policy,
    ))
}
