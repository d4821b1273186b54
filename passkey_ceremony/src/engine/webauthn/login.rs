use ring::{
    digest,
    signature::{ECDSA_P256_SHA256_ASN1, UnparsedPublicKey},
};

use crate::engine::errors::EngineError;
use crate::engine::types::{
    AssertionChallenge, AuthenticatorResponse, CeremonySession, CeremonyUser, Credential,
    CredentialDescriptor, EngineConfig, PublicKeyCredentialRequestOptions,
};
use crate::utils::{base64url_decode, base64url_encode};

use super::auth_data::AuthenticatorData;
use super::client_data::{ClientDataType, ParsedClientData};
use super::{check_credential_type, check_not_expired, check_session_user};

pub(super) fn request_options(
    config: &EngineConfig,
    session: &CeremonySession,
) -> AssertionChallenge {
    AssertionChallenge {
        public_key: PublicKeyCredentialRequestOptions {
            challenge: session.challenge.clone(),
            timeout: config.timeout_ms,
            rp_id: config.rp_id.clone(),
            allow_credentials: session
                .allowed_credentials
                .iter()
                .cloned()
                .map(CredentialDescriptor::public_key)
                .collect(),
            user_verification: session.user_verification,
        },
    }
}

/// Verifies an assertion response
///
/// The sign count is returned as reported; comparing it with the stored value
/// is left to the caller, which holds the authoritative count.
pub(super) fn verify_login(
    config: &EngineConfig,
    user: &CeremonyUser,
    session: &CeremonySession,
    response: &AuthenticatorResponse,
) -> Result<Credential, EngineError> {
    check_credential_type(&response.type_)?;
    check_session_user(user, session)?;
    check_not_expired(session)?;

    let raw_id = base64url_decode(&response.raw_id)
        .map_err(|e| EngineError::Format(format!("Invalid rawId: {e}")))?;
    let encoded_id = base64url_encode(&raw_id);
    if !session.allowed_credentials.contains(&encoded_id) {
        return Err(EngineError::Verification(
            "Credential not allowed for this session".into(),
        ));
    }

    let stored = user
        .credentials
        .iter()
        .find(|c| c.id == raw_id)
        .ok_or_else(|| EngineError::Verification("Unknown credential".into()))?;

    verify_user_handle(response, user)?;

    let client_data = ParsedClientData::from_base64(&response.response.client_data_json)?;
    client_data.verify(ClientDataType::Get, &session.challenge, &config.origin)?;

    let auth_data = AuthenticatorData::from_base64(&response.response.authenticator_data)?;
    auth_data.verify(&config.rp_id, session.user_verification)?;

    if auth_data.is_backup_eligible() != stored.backup_eligible {
        return Err(EngineError::Verification(
            "Backup eligibility flag inconsistent with stored credential".into(),
        ));
    }

    verify_signature(response, &client_data, &auth_data, stored)?;

    tracing::info!("Login verification successful for {}", user.name);

    Ok(Credential {
        id: raw_id,
        public_key: stored.public_key.clone(),
        sign_count: auth_data.counter,
        backup_eligible: stored.backup_eligible,
    })
}

/// A supplied user handle must match; an absent one is accepted
fn verify_user_handle(
    response: &AuthenticatorResponse,
    user: &CeremonyUser,
) -> Result<(), EngineError> {
    match response.response.user_handle.as_deref() {
        None | Some("") => {
            tracing::debug!("No user handle provided in assertion");
            Ok(())
        }
        Some(handle) => {
            let decoded = base64url_decode(handle)
                .map_err(|e| EngineError::Format(format!("Invalid userHandle: {e}")))?;
            if decoded != user.user_handle {
                tracing::warn!("User handle mismatch for {}", user.name);
                return Err(EngineError::Verification("User handle mismatch".into()));
            }
            Ok(())
        }
    }
}

/// ECDSA P-256 over authenticatorData || SHA-256(clientDataJSON)
fn verify_signature(
    response: &AuthenticatorResponse,
    client_data: &ParsedClientData,
    auth_data: &AuthenticatorData,
    stored: &Credential,
) -> Result<(), EngineError> {
    let signature = base64url_decode(&response.response.signature)
        .map_err(|e| EngineError::Format(format!("Invalid signature encoding: {e}")))?;

    let client_data_hash = digest::digest(&digest::SHA256, &client_data.raw_data);
    let mut signed_data = Vec::with_capacity(auth_data.raw_data.len() + 32);
    signed_data.extend_from_slice(&auth_data.raw_data);
    signed_data.extend_from_slice(client_data_hash.as_ref());

    let public_key = UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, &stored.public_key);
    public_key.verify(&signed_data, &signature).map_err(|_| {
        tracing::warn!("Signature verification failed");
        EngineError::Verification("Signature verification failed".into())
    })
}
