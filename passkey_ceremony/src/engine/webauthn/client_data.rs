use subtle::ConstantTimeEq;

use crate::engine::errors::EngineError;
use crate::utils::base64url_decode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ClientDataType {
    Create,
    Get,
}

impl ClientDataType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "webauthn.create",
            Self::Get => "webauthn.get",
        }
    }
}

/// clientDataJSON as collected by the browser
#[derive(Debug)]
pub(super) struct ParsedClientData {
    pub(super) challenge: String,
    pub(super) origin: String,
    pub(super) type_: String,
    /// Exact bytes the authenticator hashed; never re-serialize
    pub(super) raw_data: Vec<u8>,
}

impl ParsedClientData {
    pub(super) fn from_base64(client_data_json: &str) -> Result<Self, EngineError> {
        let raw_data = base64url_decode(client_data_json)
            .map_err(|e| EngineError::Format(format!("Failed to decode client data: {e}")))?;

        let data: serde_json::Value = serde_json::from_slice(&raw_data)
            .map_err(|e| EngineError::Format(format!("Invalid client data JSON: {e}")))?;

        let field = |name: &str| {
            data[name]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| EngineError::Format(format!("Missing {name} in client data")))
        };

        Ok(Self {
            challenge: field("challenge")?,
            origin: field("origin")?,
            type_: field("type")?,
            raw_data,
        })
    }

    pub(super) fn verify(
        &self,
        expected_type: ClientDataType,
        stored_challenge: &str,
        origin: &str,
    ) -> Result<(), EngineError> {
        if self.type_ != expected_type.as_str() {
            return Err(EngineError::Verification(format!(
                "Invalid type. Expected '{}', Got: {}",
                expected_type.as_str(),
                self.type_
            )));
        }

        let challenge_matches: bool = self
            .challenge
            .as_bytes()
            .ct_eq(stored_challenge.as_bytes())
            .into();
        if !challenge_matches {
            return Err(EngineError::Verification("Challenge mismatch".into()));
        }

        if self.origin != origin {
            return Err(EngineError::Verification(format!(
                "Invalid origin. Expected: {}, Got: {}",
                origin, self.origin
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64url_encode;
    use serde_json::json;

    fn encode(value: serde_json::Value) -> String {
        base64url_encode(serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn test_from_base64_keeps_raw_bytes() {
        // Given encoded client data
        let raw = br#"{"type":"webauthn.get","challenge":"abc","origin":"http://localhost:8080"}"#;
        let encoded = base64url_encode(raw);

        // When parsing
        let parsed = ParsedClientData::from_base64(&encoded).unwrap();

        // Then fields are extracted and the raw bytes preserved
        assert_eq!(parsed.type_, "webauthn.get");
        assert_eq!(parsed.challenge, "abc");
        assert_eq!(parsed.origin, "http://localhost:8080");
        assert_eq!(parsed.raw_data, raw.to_vec());
    }

    #[test]
    fn test_from_base64_rejects_missing_fields() {
        let encoded = encode(json!({"type": "webauthn.get", "origin": "x"}));
        let err = ParsedClientData::from_base64(&encoded).unwrap_err();
        assert_eq!(
            err,
            EngineError::Format("Missing challenge in client data".to_string())
        );
    }

    #[test]
    fn test_from_base64_rejects_invalid_json_and_encoding() {
        assert!(matches!(
            ParsedClientData::from_base64(&base64url_encode(b"not json")),
            Err(EngineError::Format(_))
        ));
        assert!(matches!(
            ParsedClientData::from_base64("***"),
            Err(EngineError::Format(_))
        ));
    }

    #[test]
    fn test_verify() {
        let parsed = ParsedClientData::from_base64(&encode(json!({
            "type": "webauthn.create",
            "challenge": "abc",
            "origin": "http://localhost:8080"
        })))
        .unwrap();

        assert!(
            parsed
                .verify(ClientDataType::Create, "abc", "http://localhost:8080")
                .is_ok()
        );
        // Wrong ceremony type
        assert!(matches!(
            parsed.verify(ClientDataType::Get, "abc", "http://localhost:8080"),
            Err(EngineError::Verification(_))
        ));
        // Wrong challenge
        assert_eq!(
            parsed.verify(ClientDataType::Create, "abd", "http://localhost:8080"),
            Err(EngineError::Verification("Challenge mismatch".to_string()))
        );
        // Wrong origin
        assert!(matches!(
            parsed.verify(ClientDataType::Create, "abc", "https://evil.example"),
            Err(EngineError::Verification(_))
        ));
    }
}
