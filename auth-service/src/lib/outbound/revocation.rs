use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::credentials::errors::StoreError;
use crate::domain::credentials::ports::RevocationIndex;

/// Process-local revocation index.
///
/// Maps `jti -> exp`. Entries are dropped by `sweep` once the token they
/// revoke would have expired anyway.
#[derive(Debug, Default)]
pub struct InMemoryRevocationIndex {
    entries: RwLock<HashMap<String, i64>>,
}

impl InMemoryRevocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl RevocationIndex for InMemoryRevocationIndex {
    async fn revoke(&self, jti: &str, exp: i64) -> Result<(), StoreError> {
        self.entries.write().await.insert(jti.to_string(), exp);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, StoreError> {
        Ok(self.entries.read().await.contains_key(jti))
    }

    async fn sweep(&self, now: i64) -> Result<usize, StoreError> {
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, exp| *exp > now);
        let removed = before - entries.len();

        if removed > 0 {
            tracing::debug!("Swept {} expired revocations", removed);
        }
        Ok(removed)
    }
}
