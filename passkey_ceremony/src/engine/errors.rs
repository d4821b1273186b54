use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed client payload: bad encoding, CBOR, JSON or structure
    #[error("Invalid format: {0}")]
    Format(String),

    /// Well-formed payload that fails a protocol check
    #[error("Verification failed: {0}")]
    Verification(String),

    /// Randomness or key handling failure on the server side
    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl From<UtilError> for EngineError {
    fn from(err: UtilError) -> Self {
        match err {
            UtilError::Crypto(msg) => Self::Crypto(msg),
            UtilError::Format(msg) => Self::Format(msg),
        }
    }
}
