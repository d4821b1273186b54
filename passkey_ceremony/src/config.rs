//! Environment-driven configuration for the ceremony orchestrator
//!
//! Binaries load `.env` with dotenvy before calling [`CeremonyConfig::from_env`].
//! Invalid optional values are logged and replaced with their defaults; missing
//! required values are returned as [`ConfigError`].

use std::env;
use thiserror::Error;

use crate::ceremony::{BackupEligibilityPolicy, CeremonyPolicy};
use crate::engine::{EngineConfig, UserVerification};
use crate::storage::{CacheStoreConfig, CacheStoreKind, DataStoreConfig, DataStoreKind};

/// Default lifetime of a ceremony session in the cache (24h)
pub const DEFAULT_SESSION_TTL: u64 = 86400;

const DEFAULT_TIMEOUT_SECS: u32 = 60;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Everything needed to assemble a [`crate::CeremonyOrchestrator`]
#[derive(Debug, Clone)]
pub struct CeremonyConfig {
    pub engine: EngineConfig,
    pub session_ttl: u64,
    pub policy: CeremonyPolicy,
    pub cache_store: CacheStoreConfig,
    pub data_store: DataStoreConfig,
}

impl CeremonyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            engine: engine_config_from_env()?,
            session_ttl: parse_nonzero_or_default(
                "WEBAUTHN_SESSION_TTL",
                DEFAULT_SESSION_TTL,
            ),
            policy: policy_from_env(),
            cache_store: cache_store_config_from_env()?,
            data_store: data_store_config_from_env()?,
        })
    }
}

fn engine_config_from_env() -> Result<EngineConfig, ConfigError> {
    let origin = required("ORIGIN")?;
    let rp_id = match env::var("WEBAUTHN_RP_ID") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => rp_id_from_origin(&origin)?,
    };
    let rp_name = env::var("WEBAUTHN_RP_NAME").unwrap_or_else(|_| origin.clone());
    let timeout_secs: u32 = parse_nonzero_or_default("WEBAUTHN_TIMEOUT", DEFAULT_TIMEOUT_SECS);

    let user_verification = match env::var("WEBAUTHN_USER_VERIFICATION").ok() {
        None => UserVerification::Preferred,
        Some(v) => match v.to_lowercase().as_str() {
            "required" => UserVerification::Required,
            "preferred" => UserVerification::Preferred,
            "discouraged" => UserVerification::Discouraged,
            invalid => {
                tracing::warn!(
                    "Invalid user verification: {}. Using default 'preferred'",
                    invalid
                );
                UserVerification::Preferred
            }
        },
    };

    Ok(EngineConfig {
        rp_id,
        rp_name,
        origin,
        timeout_ms: timeout_secs.saturating_mul(1000),
        user_verification,
    })
}

fn policy_from_env() -> CeremonyPolicy {
    let backup_eligibility = match env::var("WEBAUTHN_BACKUP_ELIGIBILITY").ok() {
        None => BackupEligibilityPolicy::Stored,
        Some(v) => match v.to_lowercase().as_str() {
            "stored" => BackupEligibilityPolicy::Stored,
            "assume" => BackupEligibilityPolicy::AssumeEligible,
            invalid => {
                tracing::warn!(
                    "Invalid backup eligibility policy: {}. Using default 'stored'",
                    invalid
                );
                BackupEligibilityPolicy::Stored
            }
        },
    };

    CeremonyPolicy {
        exclude_existing_credentials: parse_bool_or_default("WEBAUTHN_EXCLUDE_CREDENTIALS", true),
        backup_eligibility,
    }
}

fn cache_store_config_from_env() -> Result<CacheStoreConfig, ConfigError> {
    let store_type = required("GENERIC_CACHE_STORE_TYPE")?;
    let kind = match store_type.to_lowercase().as_str() {
        "memory" => CacheStoreKind::Memory,
        "redis" => CacheStoreKind::Redis,
        t => {
            return Err(ConfigError::Invalid {
                name: "GENERIC_CACHE_STORE_TYPE",
                reason: format!("{t}. Supported types are 'memory' and 'redis'"),
            });
        }
    };
    let url = match kind {
        CacheStoreKind::Memory => env::var("GENERIC_CACHE_STORE_URL").unwrap_or_default(),
        CacheStoreKind::Redis => required("GENERIC_CACHE_STORE_URL")?,
    };
    Ok(CacheStoreConfig { kind, url })
}

fn data_store_config_from_env() -> Result<DataStoreConfig, ConfigError> {
    let store_type = required("GENERIC_DATA_STORE_TYPE")?;
    let kind = match store_type.to_lowercase().as_str() {
        "sqlite" => DataStoreKind::Sqlite,
        "postgres" => DataStoreKind::Postgres,
        "memory" => DataStoreKind::Memory,
        t => {
            return Err(ConfigError::Invalid {
                name: "GENERIC_DATA_STORE_TYPE",
                reason: format!("{t}. Supported types are 'sqlite', 'postgres' and 'memory'"),
            });
        }
    };
    let url = match kind {
        DataStoreKind::Memory => env::var("GENERIC_DATA_STORE_URL").unwrap_or_default(),
        _ => required("GENERIC_DATA_STORE_URL")?,
    };
    let table_prefix = env::var("DB_TABLE_PREFIX").unwrap_or_default();
    Ok(DataStoreConfig {
        kind,
        url,
        table_prefix,
    })
}

/// Extracts the host part of an origin, e.g. `https://example.com:8443` -> `example.com`
pub(crate) fn rp_id_from_origin(origin: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(origin).map_err(|e| ConfigError::Invalid {
        name: "ORIGIN",
        reason: e.to_string(),
    })?;
    url.host_str()
        .map(|h| h.to_string())
        .ok_or(ConfigError::Invalid {
            name: "ORIGIN",
            reason: "origin has no host".to_string(),
        })
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_or_default<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match env::var(name) {
        Err(_) => default,
        Ok(v) => v.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}: {}. Using default '{}'", name, v, default);
            default
        }),
    }
}

/// A zero duration would expire every session as soon as it is written
fn parse_nonzero_or_default<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + PartialEq + Default + Copy,
{
    let value = parse_or_default(name, default);
    if value == T::default() {
        tracing::warn!("{} must be greater than 0. Using default '{}'", name, default);
        return default;
    }
    value
}

fn parse_bool_or_default(name: &str, default: bool) -> bool {
    match env::var(name) {
        Err(_) => default,
        Ok(v) => match v.to_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            invalid => {
                tracing::warn!("Invalid {}: {}. Using default '{}'", name, invalid, default);
                default
            }
        },
    }
}
