use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::TokenError;
use crate::random;
use crate::role::Role;

/// Claims carried inside a signed access token.
///
/// Timestamps are Unix seconds. `exp - iat` is always the access lifetime the
/// token was issued with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (user identifier)
    pub sub: Uuid,

    /// Role of the subject at issue time
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

impl AccessClaims {
    /// Tolerated forward drift of `iat` against the local clock, in seconds.
    pub const CLOCK_SKEW_SECONDS: i64 = 60;

    /// Create claims for a freshly issued access token.
    ///
    /// # Arguments
    /// * `subject` - User identifier
    /// * `role` - Role recorded in the token
    /// * `issued_at` - Issue time (Unix timestamp)
    /// * `lifetime_seconds` - Seconds until the token expires
    ///
    /// # Returns
    /// Claims with a random 128-bit `jti`
    pub fn issue(subject: Uuid, role: Role, issued_at: i64, lifetime_seconds: i64) -> Self {
        Self {
            sub: subject,
            role,
            iat: issued_at,
            exp: issued_at + lifetime_seconds,
            jti: random::token_id(),
        }
    }

    /// Check if token is expired. Expiry is strict: a token is dead at `exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }

    /// Check if token claims to be issued further in the future than the skew allows.
    pub fn is_issued_in_future(&self, current_timestamp: i64) -> bool {
        self.iat > current_timestamp + Self::CLOCK_SKEW_SECONDS
    }

    /// Check time-based validity against the given clock reading.
    ///
    /// # Errors
    /// * `Expired` - `exp <= now`
    /// * `NotYetValid` - `iat > now + skew`
    pub fn check_validity(&self, current_timestamp: i64) -> Result<(), TokenError> {
        if self.is_expired(current_timestamp) {
            return Err(TokenError::Expired);
        }
        if self.is_issued_in_future(current_timestamp) {
            return Err(TokenError::NotYetValid);
        }
        Ok(())
    }
}
