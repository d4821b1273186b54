use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::EngineError;

/// Errors returned by every orchestrator call.
///
/// Variants carry internal detail for logging. Transport layers should map
/// [`CeremonyError::kind`] to a status and a fixed message rather than
/// surfacing the inner text.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CeremonyError {
    /// Missing or malformed request fields; always caller-fixable
    #[error("{0}")]
    InputValidation(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    /// No live ceremony session: never begun, expired, overwritten or already finished
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Stored bytes failed to decode; data corruption, not retryable
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Session cache error: {0}")]
    Cache(String),

    /// The protocol engine rejected the ceremony
    #[error("Verification error: {0}")]
    Verification(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Coarse failure categories callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputValidation,
    NotFound,
    DecodeFailure,
    StoreFailure,
    CacheFailure,
    ProtocolVerificationFailure,
    Unexpected,
}

impl CeremonyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputValidation(_) => ErrorKind::InputValidation,
            Self::UserNotFound(_) | Self::SessionNotFound(_) => ErrorKind::NotFound,
            Self::Decode(_) => ErrorKind::DecodeFailure,
            Self::Store(_) => ErrorKind::StoreFailure,
            Self::Cache(_) => ErrorKind::CacheFailure,
            Self::Verification(_) => ErrorKind::ProtocolVerificationFailure,
            Self::Config(_) | Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

impl From<EngineError> for CeremonyError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Format(detail) => {
                tracing::debug!("Rejected credential data: {}", detail);
                Self::InputValidation("Invalid credential data".to_string())
            }
            EngineError::Verification(detail) => Self::Verification(detail),
            EngineError::Crypto(detail) => Self::Unexpected(detail),
        }
    }
}

impl From<ConfigError> for CeremonyError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_collapses_not_found_and_config() {
        assert_eq!(
            CeremonyError::UserNotFound("alice".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CeremonyError::SessionNotFound("alice".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CeremonyError::Config("ORIGIN must be set".into()).kind(),
            ErrorKind::Unexpected
        );
        assert_eq!(
            CeremonyError::Verification("Challenge mismatch".into()).kind(),
            ErrorKind::ProtocolVerificationFailure
        );
    }

    #[test]
    fn test_engine_errors_map_to_ceremony_errors() {
        // Given each engine failure
        let format = EngineError::Format("Missing authData".into());
        let verification = EngineError::Verification("Challenge mismatch".into());
        let crypto = EngineError::Crypto("rng failure".into());

        // Then format detail is replaced by a fixed message
        assert_eq!(
            CeremonyError::from(format),
            CeremonyError::InputValidation("Invalid credential data".into())
        );
        assert_eq!(
            CeremonyError::from(verification),
            CeremonyError::Verification("Challenge mismatch".into())
        );
        assert_eq!(CeremonyError::from(crypto).kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_config_error_conversion() {
        let err: CeremonyError = ConfigError::Missing("ORIGIN").into();
        assert_eq!(err, CeremonyError::Config("ORIGIN must be set".into()));
    }
}
