//! Shared test helpers
//!
//! [`SoftAuthenticator`] plays the browser and authenticator side of a ceremony
//! with a real P-256 key so engine and orchestrator tests exercise genuine
//! signatures instead of canned fixtures.

use std::sync::Once;

use ciborium::value::Value as CborValue;
use ring::{
    digest,
    rand::SystemRandom,
    signature::{ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair, KeyPair},
};
use serde_json::json;

use crate::engine::{
    AssertionChallenge, AuthenticatorAssertionResponse, AuthenticatorAttestationResponse,
    AuthenticatorResponse, CeremonyUser, CreationChallenge, Credential, EngineConfig,
    RegisterCredential, UserVerification,
};
use crate::utils::base64url_encode;

/// Loads `.env_test` (falling back to `.env`) once per test process
pub(crate) fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

pub(crate) const TEST_ORIGIN: &str = "http://localhost:8080";

/// UP | UV | BE
pub(crate) const DEFAULT_FLAGS: u8 = 0x01 | 0x04 | 0x08;
const FLAG_AT: u8 = 0x40;

pub(crate) fn test_engine_config() -> EngineConfig {
    EngineConfig {
        rp_id: "localhost".to_string(),
        rp_name: "Passkey Ceremony Test".to_string(),
        origin: TEST_ORIGIN.to_string(),
        timeout_ms: 60_000,
        user_verification: UserVerification::Preferred,
    }
}

pub(crate) fn test_user(name: &str, credentials: Vec<Credential>) -> CeremonyUser {
    CeremonyUser {
        user_handle: format!("handle-{name}").into_bytes(),
        name: name.to_string(),
        display_name: name.to_string(),
        credentials,
    }
}

/// Builds raw authenticator data, optionally carrying attested credential data
/// (`credential id`, `COSE key`) with an all-zero AAGUID.
pub(crate) fn auth_data_bytes(
    rp_id: &str,
    flags: u8,
    counter: u32,
    attested: Option<(&[u8], Vec<u8>)>,
) -> Vec<u8> {
    let mut data = digest::digest(&digest::SHA256, rp_id.as_bytes())
        .as_ref()
        .to_vec();
    data.push(flags);
    data.extend_from_slice(&counter.to_be_bytes());
    if let Some((credential_id, cose_key)) = attested {
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&(credential_id.len() as u16).to_be_bytes());
        data.extend_from_slice(credential_id);
        data.extend_from_slice(&cose_key);
    }
    data
}

pub(crate) fn cose_es256_key(x: &[u8], y: &[u8]) -> Vec<u8> {
    let key = CborValue::Map(vec![
        (CborValue::Integer(1i64.into()), CborValue::Integer(2i64.into())),
        (CborValue::Integer(3i64.into()), CborValue::Integer((-7i64).into())),
        (CborValue::Integer((-1i64).into()), CborValue::Integer(1i64.into())),
        (CborValue::Integer((-2i64).into()), CborValue::Bytes(x.to_vec())),
        (CborValue::Integer((-3i64).into()), CborValue::Bytes(y.to_vec())),
    ]);
    let mut encoded = Vec::new();
    ciborium::ser::into_writer(&key, &mut encoded).expect("COSE key should encode");
    encoded
}

fn client_data_json(type_: &str, challenge: &str, origin: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "type": type_,
        "challenge": challenge,
        "origin": origin,
        "crossOrigin": false,
    }))
    .expect("client data should serialize")
}

/// Software authenticator holding one ES256 credential
pub(crate) struct SoftAuthenticator {
    id: Vec<u8>,
    key_pair: EcdsaKeyPair,
    rng: SystemRandom,
    /// Counter reported in the next response
    pub(crate) counter: u32,
    /// Flags reported in assertions
    pub(crate) flags: u8,
}

impl SoftAuthenticator {
    pub(crate) fn new(id: &[u8]) -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng)
            .expect("key generation should succeed");
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), &rng)
                .expect("generated key should load");
        Self {
            id: id.to_vec(),
            key_pair,
            rng,
            counter: 0,
            flags: DEFAULT_FLAGS,
        }
    }

    /// Uncompressed SEC1 point
    pub(crate) fn public_key(&self) -> Vec<u8> {
        self.key_pair.public_key().as_ref().to_vec()
    }

    /// The credential as a relying party would have stored it
    pub(crate) fn credential(&self, sign_count: u32, backup_eligible: bool) -> Credential {
        Credential {
            id: self.id.clone(),
            public_key: self.public_key(),
            sign_count,
            backup_eligible,
        }
    }

    /// Answers a creation challenge with a "none" attestation
    pub(crate) fn register(
        &self,
        challenge: &CreationChallenge,
        origin: &str,
    ) -> RegisterCredential {
        let options = &challenge.public_key;
        let point = self.public_key();
        let cose_key = cose_es256_key(&point[1..33], &point[33..65]);
        let auth_data = auth_data_bytes(
            &options.rp.id,
            self.flags | FLAG_AT,
            self.counter,
            Some((self.id.as_slice(), cose_key)),
        );

        let attestation = CborValue::Map(vec![
            (
                CborValue::Text("fmt".to_string()),
                CborValue::Text("none".to_string()),
            ),
            (
                CborValue::Text("attStmt".to_string()),
                CborValue::Map(vec![]),
            ),
            (
                CborValue::Text("authData".to_string()),
                CborValue::Bytes(auth_data),
            ),
        ]);
        let mut attestation_object = Vec::new();
        ciborium::ser::into_writer(&attestation, &mut attestation_object)
            .expect("attestation should encode");

        let encoded_id = base64url_encode(&self.id);
        RegisterCredential {
            id: encoded_id.clone(),
            raw_id: encoded_id,
            type_: "public-key".to_string(),
            response: AuthenticatorAttestationResponse {
                client_data_json: base64url_encode(client_data_json(
                    "webauthn.create",
                    &options.challenge,
                    origin,
                )),
                attestation_object: base64url_encode(attestation_object),
            },
        }
    }

    /// Answers a request challenge, signing with this authenticator's key
    pub(crate) fn authenticate(
        &self,
        challenge: &AssertionChallenge,
        origin: &str,
        user_handle: Option<&[u8]>,
    ) -> AuthenticatorResponse {
        let mut response = self.assert("webauthn.get", challenge, origin);
        response.response.user_handle = user_handle.map(base64url_encode);
        response
    }

    /// Like [`Self::authenticate`] but with an arbitrary client data type
    pub(crate) fn authenticate_with_type(
        &self,
        challenge: &AssertionChallenge,
        origin: &str,
        type_: &str,
    ) -> AuthenticatorResponse {
        self.assert(type_, challenge, origin)
    }

    fn assert(
        &self,
        type_: &str,
        challenge: &AssertionChallenge,
        origin: &str,
    ) -> AuthenticatorResponse {
        let options = &challenge.public_key;
        let auth_data = auth_data_bytes(&options.rp_id, self.flags, self.counter, None);
        let client_data = client_data_json(type_, &options.challenge, origin);

        let client_data_hash = digest::digest(&digest::SHA256, &client_data);
        let mut signed_data = auth_data.clone();
        signed_data.extend_from_slice(client_data_hash.as_ref());
        let signature = self
            .key_pair
            .sign(&self.rng, &signed_data)
            .expect("signing should succeed");

        let encoded_id = base64url_encode(&self.id);
        AuthenticatorResponse {
            id: encoded_id.clone(),
            raw_id: encoded_id,
            type_: "public-key".to_string(),
            response: AuthenticatorAssertionResponse {
                client_data_json: base64url_encode(client_data),
                authenticator_data: base64url_encode(auth_data),
                signature: base64url_encode(signature.as_ref()),
                user_handle: None,
            },
        }
    }
}
