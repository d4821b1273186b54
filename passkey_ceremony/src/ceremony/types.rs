use serde::{Deserialize, Serialize};

use crate::engine::{AuthenticatorResponse, RegisterCredential};

use super::errors::CeremonyError;

fn require(value: &str, message: &str) -> Result<(), CeremonyError> {
    if value.trim().is_empty() {
        return Err(CeremonyError::InputValidation(message.to_string()));
    }
    Ok(())
}

fn require_username(username: &str) -> Result<(), CeremonyError> {
    require(username, "Username is required")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BeginRegistrationRequest {
    #[serde(default)]
    pub username: String,
}

impl BeginRegistrationRequest {
    pub fn validate(&self) -> Result<(), CeremonyError> {
        require_username(&self.username)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinishRegistrationRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub displayname: String,
    pub credential: RegisterCredential,
}

impl FinishRegistrationRequest {
    pub fn validate(&self) -> Result<(), CeremonyError> {
        require_username(&self.username)?;
        require(&self.displayname, "Display name is required")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BeginLoginRequest {
    #[serde(default)]
    pub username: String,
}

impl BeginLoginRequest {
    pub fn validate(&self) -> Result<(), CeremonyError> {
        require_username(&self.username)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinishLoginRequest {
    #[serde(default)]
    pub username: String,
    pub credential: AuthenticatorResponse,
}

impl FinishLoginRequest {
    pub fn validate(&self) -> Result<(), CeremonyError> {
        require_username(&self.username)
    }
}

/// Backup-eligibility flag presented to the engine at login-finish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackupEligibilityPolicy {
    /// Use the flag recorded at registration
    #[default]
    Stored,
    /// Always advertise multi-device eligibility
    AssumeEligible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CeremonyPolicy {
    /// List the identity's existing credential in `excludeCredentials` at registration-begin
    pub exclude_existing_credentials: bool,
    pub backup_eligibility: BackupEligibilityPolicy,
}

impl Default for CeremonyPolicy {
    fn default() -> Self {
        Self {
            exclude_existing_credentials: true,
            backup_eligibility: BackupEligibilityPolicy::Stored,
        }
    }
}

/// Identity confirmed by a successful login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifiedUser {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub credential_id: String,
    pub sign_count: u32,
}
