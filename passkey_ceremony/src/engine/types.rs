use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User verification requirement advertised to the client and enforced at finish
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserVerification {
    Required,
    Preferred,
    Discouraged,
}

impl UserVerification {
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }
}

/// Relying party settings for [`super::WebAuthnEngine`]
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub rp_id: String,
    pub rp_name: String,
    pub origin: String,
    pub timeout_ms: u32,
    pub user_verification: UserVerification,
}

/// The identity as presented to the protocol engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CeremonyUser {
    /// Opaque handle, stable for the lifetime of the user's credentials
    pub user_handle: Vec<u8>,
    pub name: String,
    pub display_name: String,
    pub credentials: Vec<Credential>,
}

/// Public-key credential material in raw (decoded) form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    pub id: Vec<u8>,
    /// Uncompressed SEC1 P-256 point (0x04 || x || y)
    pub public_key: Vec<u8>,
    pub sign_count: u32,
    pub backup_eligible: bool,
}

/// Server-side challenge state produced by a begin call and consumed by the matching finish.
///
/// The orchestrator stores it as JSON without looking inside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeremonySession {
    pub challenge: String,
    /// base64url of the user handle the ceremony was started for
    pub user_id: String,
    /// base64url credential ids accepted at login; empty for registration
    pub allowed_credentials: Vec<String>,
    pub user_verification: UserVerification,
    pub expires: DateTime<Utc>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct RelyingParty {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    /// base64url of the user handle
    pub id: String,
    pub name: String,
    pub display_name: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PubKeyCredParam {
    #[serde(rename = "type")]
    pub type_: String,
    pub alg: i32,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CredentialDescriptor {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: String,
}

impl CredentialDescriptor {
    pub(crate) fn public_key(id: String) -> Self {
        Self {
            type_: "public-key".to_string(),
            id,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelection {
    pub resident_key: String,
    pub user_verification: UserVerification,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialCreationOptions {
    pub challenge: String,
    pub rp: RelyingParty,
    pub user: UserEntity,
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    pub timeout: u32,
    pub exclude_credentials: Vec<CredentialDescriptor>,
    pub authenticator_selection: AuthenticatorSelection,
    pub attestation: String,
}

/// Challenge material returned by begin-registration, forwarded to the client verbatim
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreationChallenge {
    pub public_key: PublicKeyCredentialCreationOptions,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialRequestOptions {
    pub challenge: String,
    pub timeout: u32,
    pub rp_id: String,
    pub allow_credentials: Vec<CredentialDescriptor>,
    pub user_verification: UserVerification,
}

/// Challenge material returned by begin-login, forwarded to the client verbatim
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssertionChallenge {
    pub public_key: PublicKeyCredentialRequestOptions,
}

/// Client response to a creation challenge (navigator.credentials.create)
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCredential {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub response: AuthenticatorAttestationResponse,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorAttestationResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub attestation_object: String,
}

/// Client response to an assertion challenge (navigator.credentials.get)
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorResponse {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub response: AuthenticatorAssertionResponse,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorAssertionResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub authenticator_data: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}
