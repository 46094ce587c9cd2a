use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::credentials::errors::AuthError;
use crate::domain::credentials::errors::StoreError;
use crate::domain::credentials::models::EmailAddress;
use crate::domain::credentials::models::Principal;
use crate::domain::credentials::models::PurgeReport;
use crate::domain::credentials::models::RefreshCredential;
use crate::domain::credentials::models::RefreshHandle;
use crate::domain::credentials::models::Role;
use crate::domain::credentials::models::TokenPair;
use crate::domain::credentials::models::User;
use crate::domain::credentials::models::UserId;

/// Port for credential lifecycle operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// # Arguments
    /// * `email` - Raw email, case-folded before storage
    /// * `username` - Display name
    /// * `password` - Plaintext password, at least 8 characters
    ///
    /// # Returns
    /// Created user with the `user` role
    ///
    /// # Errors
    /// * `ValidationFailed` - A field failed validation
    /// * `ConflictEmail` - Email is already registered
    /// * `Storage` - Store operation failed
    async fn register(&self, email: &str, username: &str, password: &str)
        -> Result<User, AuthError>;

    /// Exchange email and password for a token pair.
    ///
    /// # Errors
    /// * `BadCredentials` - Unknown email or wrong password, indistinguishable
    /// * `Storage` - Store operation failed
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Rotate a refresh credential into a new token pair.
    ///
    /// The presented credential is revoked whether or not the caller keeps
    /// the new pair.
    ///
    /// # Errors
    /// * `Invalid` - Unknown, already used, or lost a concurrent rotation
    /// * `Expired` - Credential is past its expiry
    /// * `Storage` - Store operation failed
    async fn refresh(&self, refresh_token: &RefreshHandle) -> Result<TokenPair, AuthError>;

    /// Terminate a session.
    ///
    /// Revokes the refresh credential and, when the access token still
    /// validates, records its id as revoked until it would have expired.
    ///
    /// # Errors
    /// * `Storage` - Store operation failed
    async fn logout(
        &self,
        access_token: &str,
        refresh_token: &RefreshHandle,
    ) -> Result<(), AuthError>;

    /// Resolve a bearer access token into a principal.
    ///
    /// # Errors
    /// * `Malformed` / `BadSignature` / `Expired` / `NotYetValid` - Token rejected
    /// * `Revoked` - Token id was revoked by logout
    async fn authenticate(&self, access_token: &str) -> Result<Principal, AuthError>;

    /// Load the user behind a principal.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn current_user(&self, user_id: &UserId) -> Result<User, AuthError>;

    /// Assign a new role to a user. Takes effect on tokens issued afterwards.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn change_role(&self, user_id: &UserId, role: Role) -> Result<User, AuthError>;

    /// Drop revocations and refresh credentials that expired at or before `now`.
    ///
    /// # Errors
    /// * `Storage` - Sweep or prune failed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<PurgeReport, AuthError>;
}

/// Persistence port for users and refresh credentials.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `ConflictEmail` - Email already registered
    /// * `Storage` - Operation failed
    async fn create_user(&self, user: User) -> Result<User, StoreError>;

    /// Find user by case-folded email.
    ///
    /// # Returns
    /// User if found, None otherwise
    async fn find_user_by_email(&self, email: &EmailAddress) -> Result<Option<User>, StoreError>;

    /// Find user by identifier.
    ///
    /// # Returns
    /// User if found, None otherwise
    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Overwrite the mutable fields of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn update_user(&self, user: User) -> Result<User, StoreError>;

    /// Persist a freshly issued refresh credential.
    async fn save_refresh(&self, credential: RefreshCredential) -> Result<(), StoreError>;

    /// Find refresh credential by handle, revoked or not.
    async fn find_refresh(
        &self,
        token: &RefreshHandle,
    ) -> Result<Option<RefreshCredential>, StoreError>;

    /// Mark a refresh credential revoked. Revoking twice is not an error.
    ///
    /// # Errors
    /// * `NotFound` - No credential with this handle
    async fn revoke_refresh(&self, token: &RefreshHandle) -> Result<(), StoreError>;

    /// Atomically revoke `old` and insert `new`.
    ///
    /// Exactly one of several concurrent rotations of the same handle succeeds.
    ///
    /// # Errors
    /// * `NotFound` - `old` is missing or was already revoked
    async fn rotate_refresh(
        &self,
        old: &RefreshHandle,
        new: RefreshCredential,
    ) -> Result<(), StoreError>;

    /// Delete refresh credentials whose expiry is at or before `now`.
    ///
    /// # Returns
    /// Number of removed credentials
    async fn prune_expired_refresh(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Set of revoked access token ids, each kept until the token's own expiry.
#[async_trait]
pub trait RevocationIndex: Send + Sync + 'static {
    /// Record `jti` as revoked until `exp` (Unix timestamp).
    async fn revoke(&self, jti: &str, exp: i64) -> Result<(), StoreError>;

    async fn is_revoked(&self, jti: &str) -> Result<bool, StoreError>;

    /// Forget entries with `exp <= now`.
    ///
    /// # Returns
    /// Number of removed entries
    async fn sweep(&self, now: i64) -> Result<usize, StoreError>;
}
