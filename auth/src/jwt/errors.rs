use thiserror::Error;

/// Error type for access token operations.
///
/// Decoding failures are split by cause so callers can report expiry
/// separately from forgery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token is not yet valid")]
    NotYetValid,
}

impl TokenError {
    /// Stable name of the failure, suitable for API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::EncodingFailed(_) => "Internal",
            TokenError::Malformed(_) => "Malformed",
            TokenError::BadSignature => "BadSignature",
            TokenError::Expired => "Expired",
            TokenError::NotYetValid => "NotYetValid",
        }
    }
}
