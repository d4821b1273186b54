mod config;
mod memory;
mod redis;
mod types;

pub use config::{CacheStoreConfig, CacheStoreKind};
pub use types::{CacheStore, InMemoryCacheStore, RedisCacheStore};
