use std::sync::Arc;

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
use crate::domain::credentials::models::RegisterCommand;
use crate::domain::credentials::models::Role;
use crate::domain::credentials::models::TokenPair;
use crate::domain::credentials::models::User;
use crate::domain::credentials::models::UserId;
use crate::domain::credentials::ports::AuthServicePort;
use crate::domain::credentials::ports::RevocationIndex;
use crate::domain::credentials::ports::UserStore;
use crate::domain::credentials::tokens::TokenCodec;

// Hashed once at start-up so unknown-email logins pay a full verification.
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

/// Credential lifecycle service.
///
/// Concrete implementation of AuthServicePort over a user store and a
/// revocation index.
pub struct AuthService<US, RI>
where
    US: UserStore,
    RI: RevocationIndex,
{
    store: Arc<US>,
    revocations: Arc<RI>,
    codec: TokenCodec,
    password_hasher: Arc<auth::PasswordHasher>,
    dummy_hash: String,
}

impl<US, RI> AuthService<US, RI>
where
    US: UserStore,
    RI: RevocationIndex,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - User and refresh credential persistence
    /// * `revocations` - Revoked access token index
    /// * `codec` - Token issuing and validation
    /// * `password_hasher` - Password hashing with the configured work factor
    ///
    /// # Errors
    /// * `Internal` - Hashing the dummy password failed
    pub fn new(
        store: Arc<US>,
        revocations: Arc<RI>,
        codec: TokenCodec,
        password_hasher: auth::PasswordHasher,
    ) -> Result<Self, AuthError> {
        let dummy_hash = password_hasher.hash(DUMMY_PASSWORD)?;

        Ok(Self {
            store,
            revocations,
            codec,
            password_hasher: Arc::new(password_hasher),
            dummy_hash,
        })
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.password_hasher);

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(AuthError::from)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.password_hasher);

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification task failed: {}", e)))?
            .map_err(AuthError::from)
    }

    fn issue_pair(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<(TokenPair, RefreshCredential), AuthError> {
        let access_token = self
            .codec
            .generate_access_at(user, now)
            .map_err(|e| AuthError::Internal(format!("Token signing failed: {}", e)))?;
        let (refresh_token, credential) = self.codec.generate_refresh_at(user, now);

        let pair = TokenPair {
            access_token,
            refresh_token,
            expires_in: self.codec.access_ttl().num_seconds(),
        };
        Ok((pair, credential))
    }
}

#[async_trait]
impl<US, RI> AuthServicePort for AuthService<US, RI>
where
    US: UserStore,
    RI: RevocationIndex,
{
    async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let command = RegisterCommand::new(email, username, password)?;

        let password_hash = self
            .hash_password(command.password.expose().to_string())
            .await?;
        let user = User::new(command.email, command.username, password_hash, Utc::now());

        let created = self.store.create_user(user).await?;
        tracing::info!(user_id = %created.id, "User registered");

        Ok(created)
    }

    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = match EmailAddress::new(email.to_string()) {
            Ok(email) => self.store.find_user_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            // Same cost as a real verification; the outcome is irrelevant.
            let _ = self
                .verify_password(password.to_string(), self.dummy_hash.clone())
                .await;
            tracing::info!("Login rejected: unknown account");
            return Err(AuthError::BadCredentials);
        };

        let matches = self
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?;
        if !matches {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::BadCredentials);
        }

        let (pair, credential) = self.issue_pair(&user, Utc::now())?;
        self.store.save_refresh(credential).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &RefreshHandle) -> Result<TokenPair, AuthError> {
        let now = Utc::now();

        let credential = self
            .store
            .find_refresh(refresh_token)
            .await?
            .ok_or(AuthError::Invalid)?;

        if credential.revoked {
            tracing::warn!(
                user_id = %credential.user_id,
                "Revoked refresh token presented again"
            );
            return Err(AuthError::Invalid);
        }
        if credential.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        let user = self
            .store
            .find_user_by_id(&credential.user_id)
            .await?
            .ok_or(AuthError::Invalid)?;

        let (pair, next) = self.issue_pair(&user, now)?;

        match self.store.rotate_refresh(refresh_token, next).await {
            Ok(()) => {
                tracing::debug!(user_id = %user.id, "Refresh token rotated");
                Ok(pair)
            }
            Err(StoreError::NotFound) => {
                tracing::warn!(user_id = %user.id, "Lost refresh rotation race");
                Err(AuthError::Invalid)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn logout(
        &self,
        access_token: &str,
        refresh_token: &RefreshHandle,
    ) -> Result<(), AuthError> {
        if let Ok(principal) = self.codec.validate_access(access_token) {
            self.revocations
                .revoke(&principal.jti, principal.exp)
                .await?;
            tracing::info!(user_id = %principal.user_id, "Access token revoked");
        }

        match self.store.revoke_refresh(refresh_token).await {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn authenticate(&self, access_token: &str) -> Result<Principal, AuthError> {
        let principal = self.codec.validate_access(access_token)?;

        if self.revocations.is_revoked(&principal.jti).await? {
            return Err(AuthError::Revoked);
        }

        Ok(principal)
    }

    async fn current_user(&self, user_id: &UserId) -> Result<User, AuthError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound(user_id.to_string()))
    }

    async fn change_role(&self, user_id: &UserId, role: Role) -> Result<User, AuthError> {
        let mut user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound(user_id.to_string()))?;

        user.role = role;
        user.updated_at = Utc::now();

        let updated = self.store.update_user(user).await.map_err(|e| match e {
            StoreError::NotFound => AuthError::NotFound(user_id.to_string()),
            other => other.into(),
        })?;
        tracing::info!(user_id = %updated.id, role = %updated.role, "Role changed");

        Ok(updated)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<PurgeReport, AuthError> {
        let revocations = self.revocations.sweep(now.timestamp()).await?;
        let refresh_credentials = self.store.prune_expired_refresh(now).await?;

        Ok(PurgeReport {
            revocations,
            refresh_credentials,
        })
    }
}
