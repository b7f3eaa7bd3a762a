use thiserror::Error;

/// Error for directory backend operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// Credentials rejected, or the directory could not be reached during login.
    #[error("Directory authentication failed: {0}")]
    Authentication(String),

    /// User record could not be read (deleted, service account rejected, backend down).
    #[error("Directory lookup failed: {0}")]
    Lookup(String),
}

/// Top-level error for token lifecycle operations.
///
/// The rendered messages are generic; the carried detail is for
/// logs only and never reaches a caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication failed")]
    AuthenticationFailed(String),

    #[error("Invalid token")]
    InvalidToken(String),
}

impl AuthError {
    /// Internal detail for logging.
    pub fn detail(&self) -> &str {
        match self {
            AuthError::AuthenticationFailed(detail) | AuthError::InvalidToken(detail) => detail,
        }
    }
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        AuthError::AuthenticationFailed(err.to_string())
    }
}

impl From<auth::JwtError> for AuthError {
    fn from(err: auth::JwtError) -> Self {
        AuthError::InvalidToken(err.to_string())
    }
}
