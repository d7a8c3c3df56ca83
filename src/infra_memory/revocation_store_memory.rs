use crate::application_port::AuthError;
use crate::domain_port::RevocationStore;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Revocation set in process memory: key to underlying-token expiry.
/// Presence means revoked; the expiry only bounds retention.
pub struct MemoryRevocationStore {
    entries: DashMap<String, DateTime<Utc>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        MemoryRevocationStore {
            entries: DashMap::new(),
        }
    }
}

impl Default for MemoryRevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, key: &str, expires_at: DateTime<Utc>) -> Result<(), AuthError> {
        // Re-revocation keeps the later expiry so the entry outlives the
        // longest-lived copy of the token.
        self.entries
            .entry(key.to_string())
            .and_modify(|exp| {
                if expires_at > *exp {
                    *exp = expires_at;
                }
            })
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, key: &str) -> Result<bool, AuthError> {
        Ok(self.entries.contains_key(key))
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let before = self.entries.len();
        self.entries.retain(|_, exp| now <= *exp);
        Ok(before.saturating_sub(self.entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn revoke_is_idempotent_and_sticky() {
        let store = MemoryRevocationStore::new();
        let exp = Utc::now() + chrono::Duration::minutes(15);

        assert!(!store.is_revoked("k1").await.unwrap());
        store.revoke("k1", exp).await.unwrap();
        store.revoke("k1", exp).await.unwrap();
        assert!(store.is_revoked("k1").await.unwrap());
    }

    #[tokio::test]
    async fn sweep_purges_only_entries_past_their_expiry() {
        let store = MemoryRevocationStore::new();
        let now = Utc::now();
        store
            .revoke("dead", now - chrono::Duration::seconds(1))
            .await
            .unwrap();
        store
            .revoke("live", now + chrono::Duration::minutes(15))
            .await
            .unwrap();

        let purged = store.sweep_expired(now).await.unwrap();
        assert_eq!(purged, 1);
        assert!(!store.is_revoked("dead").await.unwrap());
        assert!(store.is_revoked("live").await.unwrap());
    }
}
