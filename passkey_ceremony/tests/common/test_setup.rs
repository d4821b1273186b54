use passkey_ceremony::{
    CacheStoreConfig, CacheStoreKind, CeremonyConfig, CeremonyOrchestrator, CeremonyPolicy,
    DEFAULT_SESSION_TTL, DataStoreConfig, DataStoreKind, EngineConfig, UserVerification,
    init_with_config,
};

pub const TEST_ORIGIN: &str = "http://127.0.0.1:3000";

fn config(kind: DataStoreKind, url: &str) -> CeremonyConfig {
    CeremonyConfig {
        engine: EngineConfig {
            rp_id: "127.0.0.1".to_string(),
            rp_name: "Integration Test RP".to_string(),
            origin: TEST_ORIGIN.to_string(),
            timeout_ms: 60_000,
            user_verification: UserVerification::Preferred,
        },
        session_ttl: DEFAULT_SESSION_TTL,
        policy: CeremonyPolicy::default(),
        cache_store: CacheStoreConfig {
            kind: CacheStoreKind::Memory,
            url: String::new(),
        },
        data_store: DataStoreConfig {
            kind,
            url: url.to_string(),
            table_prefix: "it_".to_string(),
        },
    }
}

/// Orchestrator backed by an in-memory SQLite credential table
pub async fn sqlite_orchestrator() -> CeremonyOrchestrator {
    init_with_config(&config(DataStoreKind::Sqlite, "sqlite::memory:"))
        .await
        .expect("sqlite orchestrator should initialize")
}

/// Orchestrator with both stores in process memory
pub async fn memory_orchestrator() -> CeremonyOrchestrator {
    init_with_config(&config(DataStoreKind::Memory, ""))
        .await
        .expect("memory orchestrator should initialize")
}
