use crate::engine::errors::EngineError;
use crate::engine::types::{
    AuthenticatorSelection, CeremonySession, CeremonyUser, CreationChallenge, Credential,
    CredentialDescriptor, EngineConfig, PubKeyCredParam, PublicKeyCredentialCreationOptions,
    RegisterCredential, RelyingParty, UserEntity,
};
use crate::utils::{base64url_decode, base64url_encode};

use super::auth_data::{AttestationObject, AuthenticatorData};
use super::client_data::{ClientDataType, ParsedClientData};
use super::{check_credential_type, check_not_expired, check_session_user};

pub(super) fn creation_options(
    config: &EngineConfig,
    user: &CeremonyUser,
    session: &CeremonySession,
) -> CreationChallenge {
    CreationChallenge {
        public_key: PublicKeyCredentialCreationOptions {
            challenge: session.challenge.clone(),
            rp: RelyingParty {
                id: config.rp_id.clone(),
                name: config.rp_name.clone(),
            },
            user: UserEntity {
                id: session.user_id.clone(),
                name: user.name.clone(),
                display_name: user.display_name.clone(),
            },
            pub_key_cred_params: vec![PubKeyCredParam {
                type_: "public-key".to_string(),
                alg: -7,
            }],
            timeout: config.timeout_ms,
            exclude_credentials: user
                .credentials
                .iter()
                .map(|c| CredentialDescriptor::public_key(base64url_encode(&c.id)))
                .collect(),
            authenticator_selection: AuthenticatorSelection {
                resident_key: "preferred".to_string(),
                user_verification: config.user_verification,
            },
            attestation: "none".to_string(),
        },
    }
}

/// Verifies a registration response
///
/// 1. Checks the session belongs to this user and is still valid
/// 2. Verifies client data (type, challenge, origin)
/// 3. Verifies authenticator data (RP ID hash, flags)
/// 4. Extracts the attested credential and checks it matches `rawId`
pub(super) fn verify_registration(
    config: &EngineConfig,
    user: &CeremonyUser,
    session: &CeremonySession,
    credential: &RegisterCredential,
) -> Result<Credential, EngineError> {
    check_credential_type(&credential.type_)?;
    check_session_user(user, session)?;
    check_not_expired(session)?;

    let client_data = ParsedClientData::from_base64(&credential.response.client_data_json)?;
    client_data.verify(ClientDataType::Create, &session.challenge, &config.origin)?;

    let attestation = AttestationObject::from_base64(&credential.response.attestation_object)?;
    tracing::debug!("Attestation format: {}", attestation.fmt);

    let auth_data = AuthenticatorData::from_bytes(attestation.auth_data)?;
    auth_data.verify(&config.rp_id, session.user_verification)?;

    let attested = auth_data.attested_credential()?;
    tracing::trace!("AAGUID: {}", base64url_encode(&attested.aaguid));

    let raw_id = base64url_decode(&credential.raw_id)
        .map_err(|e| EngineError::Format(format!("Invalid rawId: {e}")))?;
    if attested.credential_id != raw_id {
        return Err(EngineError::Verification(
            "Credential ID does not match attested credential data".into(),
        ));
    }

    tracing::info!("Registration verification successful for {}", user.name);

    Ok(Credential {
        id: raw_id,
        public_key: attested.public_key,
        sign_count: auth_data.counter,
        backup_eligible: auth_data.is_backup_eligible(),
    })
}
