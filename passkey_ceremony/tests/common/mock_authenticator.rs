//! Software authenticator for driving ceremonies end to end

use ciborium::value::Value as CborValue;
use ring::{
    digest,
    rand::SystemRandom,
    signature::{ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair, KeyPair},
};

use passkey_ceremony::{
    AssertionChallenge, AuthenticatorAssertionResponse, AuthenticatorAttestationResponse,
    AuthenticatorResponse, CreationChallenge, RegisterCredential, base64url_encode,
};

/// UP | UV
const FLAGS: u8 = 0x01 | 0x04;
const FLAG_AT: u8 = 0x40;

pub struct MockAuthenticator {
    id: Vec<u8>,
    key_pair: EcdsaKeyPair,
    rng: SystemRandom,
    /// Counter reported in the next response
    pub counter: u32,
}

impl MockAuthenticator {
    pub fn new(id: &[u8]) -> Self {
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
        }
    }

    pub fn credential_id(&self) -> String {
        base64url_encode(&self.id)
    }

    fn auth_data(&self, rp_id: &str, flags: u8, attested: Option<Vec<u8>>) -> Vec<u8> {
        let mut data = digest::digest(&digest::SHA256, rp_id.as_bytes())
            .as_ref()
            .to_vec();
        data.push(flags);
        data.extend_from_slice(&self.counter.to_be_bytes());
        if let Some(cose_key) = attested {
            data.extend_from_slice(&[0u8; 16]);
            data.extend_from_slice(&(self.id.len() as u16).to_be_bytes());
            data.extend_from_slice(&self.id);
            data.extend_from_slice(&cose_key);
        }
        data
    }

    fn cose_key(&self) -> Vec<u8> {
        let point = self.key_pair.public_key().as_ref();
        let key = CborValue::Map(vec![
            (CborValue::Integer(1i64.into()), CborValue::Integer(2i64.into())),
            (CborValue::Integer(3i64.into()), CborValue::Integer((-7i64).into())),
            (CborValue::Integer((-1i64).into()), CborValue::Integer(1i64.into())),
            (
                CborValue::Integer((-2i64).into()),
                CborValue::Bytes(point[1..33].to_vec()),
            ),
            (
                CborValue::Integer((-3i64).into()),
                CborValue::Bytes(point[33..65].to_vec()),
            ),
        ]);
        let mut encoded = Vec::new();
        ciborium::ser::into_writer(&key, &mut encoded).expect("COSE key should encode");
        encoded
    }

    fn client_data(type_: &str, challenge: &str, origin: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "type": type_,
            "challenge": challenge,
            "origin": origin,
        }))
        .expect("client data should serialize")
    }

    pub fn register(&self, challenge: &CreationChallenge, origin: &str) -> RegisterCredential {
        let options = &challenge.public_key;
        let auth_data = self.auth_data(&options.rp.id, FLAGS | FLAG_AT, Some(self.cose_key()));
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

        RegisterCredential {
            id: self.credential_id(),
            raw_id: self.credential_id(),
            type_: "public-key".to_string(),
            response: AuthenticatorAttestationResponse {
                client_data_json: base64url_encode(Self::client_data(
                    "webauthn.create",
                    &options.challenge,
                    origin,
                )),
                attestation_object: base64url_encode(attestation_object),
            },
        }
    }

    pub fn authenticate(
        &self,
        challenge: &AssertionChallenge,
        origin: &str,
    ) -> AuthenticatorResponse {
        let options = &challenge.public_key;
        let auth_data = self.auth_data(&options.rp_id, FLAGS, None);
        let client_data = Self::client_data("webauthn.get", &options.challenge, origin);

        let mut signed = auth_data.clone();
        signed.extend_from_slice(digest::digest(&digest::SHA256, &client_data).as_ref());
        let signature = self
            .key_pair
            .sign(&self.rng, &signed)
            .expect("signing should succeed");

        AuthenticatorResponse {
            id: self.credential_id(),
            raw_id: self.credential_id(),
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
