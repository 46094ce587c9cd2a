use auth::AccessClaims;
use auth::JwtHandler;
use auth::TokenError;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::credentials::models::Principal;
use crate::domain::credentials::models::RefreshCredential;
use crate::domain::credentials::models::RefreshHandle;
use crate::domain::credentials::models::User;
use crate::domain::credentials::models::UserId;

/// Issues and validates access tokens, and mints refresh credentials.
///
/// Holds no state besides the signing key and the two lifetimes. Every
/// operation has an `_at` form taking an explicit clock reading.
pub struct TokenCodec {
    jwt: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// # Arguments
    /// * `secret` - HS256 signing key
    /// * `access_ttl` - Access token lifetime
    /// * `refresh_ttl` - Refresh credential lifetime
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            jwt: JwtHandler::new(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn generate_access(&self, user: &User) -> Result<String, TokenError> {
        self.generate_access_at(user, Utc::now())
    }

    /// Sign an access token for `user` issued at `now`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn generate_access_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = AccessClaims::issue(
            user.id.0,
            user.role,
            now.timestamp(),
            self.access_ttl.num_seconds(),
        );
        self.jwt.encode(&claims)
    }

    pub fn generate_refresh(&self, user: &User) -> (RefreshHandle, RefreshCredential) {
        self.generate_refresh_at(user, Utc::now())
    }

    /// Mint a refresh credential for `user`. The caller persists it.
    pub fn generate_refresh_at(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> (RefreshHandle, RefreshCredential) {
        let handle = RefreshHandle::generate();
        let credential = RefreshCredential {
            token: handle.clone(),
            user_id: user.id,
            issued_at: now,
            expires_at: now + self.refresh_ttl,
            revoked: false,
        };
        (handle, credential)
    }

    pub fn validate_access(&self, token: &str) -> Result<Principal, TokenError> {
        self.validate_access_at(token, Utc::now())
    }

    /// Verify signature and time claims of an access token.
    ///
    /// Does not consult the revocation index.
    ///
    /// # Errors
    /// * `Malformed` - Not a well-formed HS256 token with the expected claims
    /// * `BadSignature` - Signature does not match
    /// * `Expired` - `exp <= now`
    /// * `NotYetValid` - `iat` is beyond the tolerated skew
    pub fn validate_access_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Principal, TokenError> {
        let claims: AccessClaims = self.jwt.decode(token)?;
        claims.check_validity(now.timestamp())?;

        Ok(Principal {
            user_id: UserId(claims.sub),
            role: claims.role,
            jti: claims.jti,
            exp: claims.exp,
        })
    }
}
