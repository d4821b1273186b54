use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, postgres::PgRow, sqlite::SqliteRow};

use crate::engine::Credential;
use crate::utils::{UtilError, base64url_decode, base64url_encode};

/// A row of the users table: an identity plus at most one enrolled credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
    /// base64url user handle, generated once at first registration
    pub webauthn_user_id: Option<String>,
    pub webauthn_displayname: Option<String>,
    pub webauthn_credential_id: Option<String>,
    pub webauthn_credential_public_key: Option<String>,
    pub webauthn_sign_count: u32,
    pub webauthn_backup_eligible: bool,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            webauthn_user_id: None,
            webauthn_displayname: None,
            webauthn_credential_id: None,
            webauthn_credential_public_key: None,
            webauthn_sign_count: 0,
            webauthn_backup_eligible: false,
            created_at: Utc::now(),
        }
    }

    /// The enrolled credential, present only when both id and key are stored
    pub fn stored_credential(&self) -> Option<StoredCredential> {
        match (
            &self.webauthn_credential_id,
            &self.webauthn_credential_public_key,
        ) {
            (Some(id), Some(key)) if !id.is_empty() && !key.is_empty() => {
                Some(StoredCredential {
                    credential_id: id.clone(),
                    public_key: key.clone(),
                    sign_count: self.webauthn_sign_count,
                    backup_eligible: self.webauthn_backup_eligible,
                })
            }
            _ => None,
        }
    }

    pub(crate) fn apply(&mut self, record: &CredentialRecord) {
        self.webauthn_user_id = Some(record.user_handle.clone());
        self.webauthn_displayname = Some(record.display_name.clone());
        self.webauthn_credential_id = Some(record.credential_id.clone());
        self.webauthn_credential_public_key = Some(record.public_key.clone());
        self.webauthn_sign_count = record.sign_count;
        self.webauthn_backup_eligible = record.backup_eligible;
    }
}

/// Credential material in its stored (base64url) form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub credential_id: String,
    pub public_key: String,
    pub sign_count: u32,
    pub backup_eligible: bool,
}

impl StoredCredential {
    /// Decodes the stored id and key back into raw bytes
    pub fn decode(&self) -> Result<Credential, UtilError> {
        Ok(Credential {
            id: base64url_decode(&self.credential_id)?,
            public_key: base64url_decode(&self.public_key)?,
            sign_count: self.sign_count,
            backup_eligible: self.backup_eligible,
        })
    }
}

/// Values written to the webauthn columns when registration finishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub user_handle: String,
    pub display_name: String,
    pub credential_id: String,
    pub public_key: String,
    pub sign_count: u32,
    pub backup_eligible: bool,
}

impl CredentialRecord {
    pub fn new(user_handle: &[u8], display_name: &str, credential: &Credential) -> Self {
        Self {
            user_handle: base64url_encode(user_handle),
            display_name: display_name.to_string(),
            credential_id: base64url_encode(&credential.id),
            public_key: base64url_encode(&credential.public_key),
            sign_count: credential.sign_count,
            backup_eligible: credential.backup_eligible,
        }
    }
}

fn sign_count_from_i64(value: i64) -> Result<u32, sqlx::Error> {
    u32::try_from(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

impl<'r> FromRow<'r, SqliteRow> for Identity {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let sign_count: i64 = row.try_get("webauthn_sign_count")?;
        Ok(Identity {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            webauthn_user_id: row.try_get("webauthn_user_id")?,
            webauthn_displayname: row.try_get("webauthn_displayname")?,
            webauthn_credential_id: row.try_get("webauthn_credential_id")?,
            webauthn_credential_public_key: row.try_get("webauthn_credential_public_key")?,
            webauthn_sign_count: sign_count_from_i64(sign_count)?,
            webauthn_backup_eligible: row.try_get("webauthn_backup_eligible")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Identity {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let sign_count: i64 = row.try_get("webauthn_sign_count")?;
        Ok(Identity {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            webauthn_user_id: row.try_get("webauthn_user_id")?,
            webauthn_displayname: row.try_get("webauthn_displayname")?,
            webauthn_credential_id: row.try_get("webauthn_credential_id")?,
            webauthn_credential_public_key: row.try_get("webauthn_credential_public_key")?,
            webauthn_sign_count: sign_count_from_i64(sign_count)?,
            webauthn_backup_eligible: row.try_get("webauthn_backup_eligible")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
