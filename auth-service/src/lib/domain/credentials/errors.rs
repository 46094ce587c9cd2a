use auth::PasswordError;
use auth::TokenError;
use auth::UnknownRole;
use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must not be empty")]
    Empty,

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Username contains control characters")]
    ControlCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),

    #[error("Email too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for password policy violations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Input validation failures, all surfaced to callers as `ValidationFailed`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    WeakPassword(#[from] PasswordPolicyError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] UnknownRole),
}

/// Failures reported by a `UserStore` or `RevocationIndex` implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Email already exists: {0}")]
    ConflictEmail(String),

    #[error("Record not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Top-level error for all credential lifecycle operations
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Invalid email or password")]
    BadCredentials,

    #[error("Email already exists: {0}")]
    ConflictEmail(String),

    // Refresh credential rejections
    #[error("Refresh token is invalid")]
    Invalid,

    #[error("Refresh token is expired")]
    Expired,

    // Access token rejections
    #[error("{0}")]
    Unauthenticated(String),

    #[error("Access token has been revoked")]
    Revoked,

    #[error("Access token rejected: {0}")]
    Token(#[from] TokenError),

    #[error("Insufficient role")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

impl AuthError {
    /// Stable name of the error kind, reported to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::ValidationFailed(_) => "ValidationFailed",
            AuthError::BadCredentials => "BadCredentials",
            AuthError::ConflictEmail(_) => "ConflictEmail",
            AuthError::Invalid => "Invalid",
            AuthError::Expired => "Expired",
            AuthError::Unauthenticated(_) => "Unauthenticated",
            AuthError::Revoked => "Revoked",
            AuthError::Token(err) => err.kind(),
            AuthError::Forbidden => "Forbidden",
            AuthError::NotFound(_) => "NotFound",
            AuthError::Storage(_) => "Storage",
            AuthError::Internal(_) => "Internal",
            AuthError::DeadlineExceeded => "DeadlineExceeded",
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConflictEmail(email) => AuthError::ConflictEmail(email),
            StoreError::NotFound => AuthError::NotFound("record".to_string()),
            StoreError::Storage(msg) => AuthError::Storage(msg),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
