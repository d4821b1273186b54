use ciborium::value::{Integer, Value as CborValue};
use ring::digest;

use crate::engine::errors::EngineError;
use crate::engine::types::UserVerification;
use crate::utils::base64url_decode;

/// Flags for AuthenticatorData as defined in WebAuthn Level 2
mod auth_data_flags {
    /// User Present (UP) - Bit 0
    pub(super) const UP: u8 = 1 << 0;
    /// User Verified (UV) - Bit 2
    pub(super) const UV: u8 = 1 << 2;
    /// Backup Eligibility (BE) - Bit 3
    pub(super) const BE: u8 = 1 << 3;
    /// Backup State (BS) - Bit 4
    pub(super) const BS: u8 = 1 << 4;
    /// Attested Credential Data Present - Bit 6
    pub(super) const AT: u8 = 1 << 6;
}

// COSE key parameters (RFC 9053)
const COSE_KTY: i64 = 1;
const COSE_ALG: i64 = 3;
const COSE_CRV: i64 = -1;
const COSE_X: i64 = -2;
const COSE_Y: i64 = -3;
const COSE_KTY_EC2: i64 = 2;
const COSE_ALG_ES256: i64 = -7;
const COSE_CRV_P256: i64 = 1;

const AUTH_DATA_MIN_LEN: usize = 37;

/// Authenticator data: rpIdHash(32) | flags(1) | signCount(4, big-endian) | [attested credential] | [extensions]
#[derive(Debug)]
pub(super) struct AuthenticatorData {
    pub(super) rp_id_hash: Vec<u8>,
    pub(super) flags: u8,
    pub(super) counter: u32,
    pub(super) raw_data: Vec<u8>,
}

/// Credential data attested during registration
#[derive(Debug)]
pub(super) struct AttestedCredential {
    pub(super) aaguid: Vec<u8>,
    pub(super) credential_id: Vec<u8>,
    /// Uncompressed P-256 point
    pub(super) public_key: Vec<u8>,
}

impl AuthenticatorData {
    pub(super) fn from_base64(auth_data: &str) -> Result<Self, EngineError> {
        let data = base64url_decode(auth_data)
            .map_err(|e| EngineError::Format(format!("Failed to decode authenticator data: {e}")))?;
        Self::from_bytes(data)
    }

    pub(super) fn from_bytes(data: Vec<u8>) -> Result<Self, EngineError> {
        if data.len() < AUTH_DATA_MIN_LEN {
            return Err(EngineError::Format("Authenticator data too short".into()));
        }

        Ok(Self {
            rp_id_hash: data[..32].to_vec(),
            flags: data[32],
            counter: u32::from_be_bytes([data[33], data[34], data[35], data[36]]),
            raw_data: data,
        })
    }

    pub(super) fn is_user_present(&self) -> bool {
        (self.flags & auth_data_flags::UP) != 0
    }

    pub(super) fn is_user_verified(&self) -> bool {
        (self.flags & auth_data_flags::UV) != 0
    }

    pub(super) fn is_backup_eligible(&self) -> bool {
        (self.flags & auth_data_flags::BE) != 0
    }

    pub(super) fn is_backed_up(&self) -> bool {
        (self.flags & auth_data_flags::BS) != 0
    }

    pub(super) fn has_attested_credential_data(&self) -> bool {
        (self.flags & auth_data_flags::AT) != 0
    }

    /// Checks the RP ID hash, user presence and, when required, user verification
    pub(super) fn verify(
        &self,
        rp_id: &str,
        user_verification: UserVerification,
    ) -> Result<(), EngineError> {
        let expected_hash = digest::digest(&digest::SHA256, rp_id.as_bytes());
        if self.rp_id_hash != expected_hash.as_ref() {
            return Err(EngineError::Verification("Invalid RP ID hash".into()));
        }

        if !self.is_user_present() {
            return Err(EngineError::Verification("User not present".into()));
        }

        if user_verification.is_required() && !self.is_user_verified() {
            return Err(EngineError::Verification(format!(
                "User verification required but flag not set. Flags: {:02x}",
                self.flags
            )));
        }

        tracing::debug!(
            user_verified = self.is_user_verified(),
            backup_eligible = self.is_backup_eligible(),
            backed_up = self.is_backed_up(),
            "Authenticator data verification passed"
        );

        Ok(())
    }

    /// Parses the attested credential data block that follows the fixed header
    pub(super) fn attested_credential(&self) -> Result<AttestedCredential, EngineError> {
        if !self.has_attested_credential_data() {
            return Err(EngineError::Verification(
                "No attested credential data present".into(),
            ));
        }

        let data = &self.raw_data;
        let mut pos = AUTH_DATA_MIN_LEN;

        if data.len() < pos + 18 {
            return Err(EngineError::Format("Authenticator data too short".into()));
        }

        let aaguid = data[pos..pos + 16].to_vec();
        pos += 16;

        let cred_id_len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        pos += 2;

        if cred_id_len == 0 || cred_id_len > 1023 {
            return Err(EngineError::Format("Invalid credential ID length".into()));
        }

        if data.len() < pos + cred_id_len {
            return Err(EngineError::Format(
                "Authenticator data too short for credential ID".into(),
            ));
        }

        let credential_id = data[pos..pos + cred_id_len].to_vec();
        pos += cred_id_len;

        let public_key = parse_cose_es256_key(&data[pos..])?;

        Ok(AttestedCredential {
            aaguid,
            credential_id,
            public_key,
        })
    }
}

/// Decodes an EC2 P-256 COSE key into an uncompressed SEC1 point
fn parse_cose_es256_key(cose: &[u8]) -> Result<Vec<u8>, EngineError> {
    let value: CborValue = ciborium::de::from_reader(cose)
        .map_err(|e| EngineError::Format(format!("Invalid public key CBOR: {e}")))?;

    let CborValue::Map(map) = value else {
        return Err(EngineError::Format("Invalid public key format".into()));
    };

    let int_param = |label: i64| {
        map.iter().find_map(|(k, v)| match (k, v) {
            (CborValue::Integer(k), CborValue::Integer(v)) if *k == Integer::from(label) => {
                i64::try_from(*v).ok()
            }
            _ => None,
        })
    };
    let bytes_param = |label: i64| {
        map.iter().find_map(|(k, v)| match (k, v) {
            (CborValue::Integer(k), CborValue::Bytes(b)) if *k == Integer::from(label) => {
                Some(b.clone())
            }
            _ => None,
        })
    };

    if int_param(COSE_KTY) != Some(COSE_KTY_EC2) {
        return Err(EngineError::Verification("Unsupported key type".into()));
    }
    if int_param(COSE_ALG) != Some(COSE_ALG_ES256) {
        return Err(EngineError::Verification("Unsupported key algorithm".into()));
    }
    if int_param(COSE_CRV) != Some(COSE_CRV_P256) {
        return Err(EngineError::Verification("Unsupported curve".into()));
    }

    match (bytes_param(COSE_X), bytes_param(COSE_Y)) {
        (Some(x), Some(y)) if x.len() == 32 && y.len() == 32 => {
            let mut public_key = Vec::with_capacity(65);
            public_key.push(0x04);
            public_key.extend_from_slice(&x);
            public_key.extend_from_slice(&y);
            Ok(public_key)
        }
        _ => Err(EngineError::Format(
            "Missing or invalid key coordinates".into(),
        )),
    }
}

/// CBOR attestation object: { fmt, authData, attStmt }
#[derive(Debug)]
pub(super) struct AttestationObject {
    pub(super) fmt: String,
    pub(super) auth_data: Vec<u8>,
}

impl AttestationObject {
    /// The attestation statement is required to be present but is not verified.
    pub(super) fn from_base64(attestation_base64: &str) -> Result<Self, EngineError> {
        let bytes = base64url_decode(attestation_base64).map_err(|e| {
            EngineError::Format(format!("Failed to decode attestation object: {e}"))
        })?;

        let value: CborValue = ciborium::de::from_reader(&bytes[..])
            .map_err(|e| EngineError::Format(format!("Invalid CBOR data: {e}")))?;

        let CborValue::Map(map) = value else {
            return Err(EngineError::Format("Invalid attestation format".into()));
        };

        let mut fmt = None;
        let mut auth_data = None;
        let mut has_att_stmt = false;

        for (key, value) in map {
            match (key, value) {
                (CborValue::Text(k), CborValue::Text(f)) if k == "fmt" => fmt = Some(f),
                (CborValue::Text(k), CborValue::Bytes(d)) if k == "authData" => {
                    auth_data = Some(d)
                }
                (CborValue::Text(k), CborValue::Map(_)) if k == "attStmt" => has_att_stmt = true,
                _ => {}
            }
        }

        match (fmt, auth_data, has_att_stmt) {
            (Some(fmt), Some(auth_data), true) => Ok(Self { fmt, auth_data }),
            _ => Err(EngineError::Format(
                "Missing required attestation data".into(),
            )),
        }
    }
}
