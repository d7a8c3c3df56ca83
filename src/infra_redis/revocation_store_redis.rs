use crate::application_port::AuthError;
use crate::domain_port::RevocationStore;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Revocation entries under `{prefix}:revoked:{key}`, TTL'd to the
/// underlying token's expiry so Redis retires them on its own.
pub struct RedisRevocationStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisRevocationStore {
    pub fn new(conn: redis::aio::ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisRevocationStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, revocation_key: &str) -> String {
        format!("{}:revoked:{}", self.prefix, revocation_key)
    }

    fn ttl_secs(until: DateTime<Utc>) -> u64 {
        let now = Utc::now();
        let secs = (until - now).num_seconds();
        if secs <= 0 { 1 } else { secs as u64 }
    }
}

#[async_trait::async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, key: &str, expires_at: DateTime<Utc>) -> Result<(), AuthError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, 1i64, Self::ttl_secs(expires_at))
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(())
    }

    async fn is_revoked(&self, key: &str) -> Result<bool, AuthError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let present: bool = conn
            .exists(&key)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(present)
    }

    async fn sweep_expired(&self, _now: DateTime<Utc>) -> Result<u64, AuthError> {
        // Entries carry their own TTL; Redis purges them natively.
        Ok(0)
    }
}
