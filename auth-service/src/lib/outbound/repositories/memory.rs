use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::credentials::errors::StoreError;
use crate::domain::credentials::models::EmailAddress;
use crate::domain::credentials::models::RefreshCredential;
use crate::domain::credentials::models::RefreshHandle;
use crate::domain::credentials::models::User;
use crate::domain::credentials::models::UserId;
use crate::domain::credentials::ports::UserStore;

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    /// Map of email -> user id, the uniqueness index
    emails: HashMap<EmailAddress, UserId>,
    refresh: HashMap<RefreshHandle, RefreshCredential>,
}

/// Single-process user store for tests and local development.
///
/// All state sits behind one lock, so every mutation is a single critical
/// section.
#[derive(Default)]
pub struct InMemoryUserStore {
    state: RwLock<State>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        if state.emails.contains_key(&user.email) {
            return Err(StoreError::ConflictEmail(user.email.as_str().to_string()));
        }

        state.emails.insert(user.email.clone(), user.id);
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;

        Ok(state
            .emails
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn update_user(&self, user: User) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        let previous_email = match state.users.get(&user.id) {
            Some(existing) => existing.email.clone(),
            None => return Err(StoreError::NotFound),
        };

        if previous_email != user.email {
            if state.emails.contains_key(&user.email) {
                return Err(StoreError::ConflictEmail(user.email.as_str().to_string()));
            }
            state.emails.remove(&previous_email);
            state.emails.insert(user.email.clone(), user.id);
        }
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn save_refresh(&self, credential: RefreshCredential) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .refresh
            .insert(credential.token.clone(), credential);
        Ok(())
    }

    async fn find_refresh(
        &self,
        token: &RefreshHandle,
    ) -> Result<Option<RefreshCredential>, StoreError> {
        Ok(self.state.read().await.refresh.get(token).cloned())
    }

    async fn revoke_refresh(&self, token: &RefreshHandle) -> Result<(), StoreError> {
        match self.state.write().await.refresh.get_mut(token) {
            Some(credential) => {
                credential.revoked = true;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn rotate_refresh(
        &self,
        old: &RefreshHandle,
        new: RefreshCredential,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        match state.refresh.get_mut(old) {
            Some(credential) if !credential.revoked => credential.revoked = true,
            _ => return Err(StoreError::NotFound),
        }
        state.refresh.insert(new.token.clone(), new);

        Ok(())
    }

    async fn prune_expired_refresh(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;

        let before = state.refresh.len();
        state
            .refresh
            .retain(|_, credential| !credential.is_expired_at(now));

        Ok((before - state.refresh.len()) as u64)
    }
}
