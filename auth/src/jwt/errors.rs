use thiserror::Error;

/// Error type for token operations.
///
/// Bad signatures, malformed payloads and expired tokens all surface as
/// `InvalidToken`; the message is for logs, callers only see the variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}
