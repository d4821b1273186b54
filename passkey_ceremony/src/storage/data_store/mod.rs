mod config;
mod types;

pub use config::{DataStoreConfig, DataStoreKind};
pub use types::{DataStore, PostgresDataStore, SqliteDataStore};
