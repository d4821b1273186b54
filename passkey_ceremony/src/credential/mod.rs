//! Durable credential records keyed by username

mod storage;
mod types;

pub use storage::{CredentialStore, InMemoryCredentialStore, SqlCredentialStore};
pub use types::{CredentialRecord, Identity, StoredCredential};
