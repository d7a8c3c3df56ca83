use crate::application_port::AuthError;
use chrono::{DateTime, Utc};

/// Tracks explicitly invalidated credentials.
///
/// Keys are opaque to the store: the authority passes a sha256 digest of the
/// token string so raw tokens are never persisted. Each entry carries the
/// underlying token's expiry so the store can purge entries that no longer
/// matter — an expired token fails verification on its own.
///
/// Absence of an entry never means "valid": expiry and signature checks run
/// regardless.
#[async_trait::async_trait]
pub trait RevocationStore: Send + Sync {
    /// Idempotent; revoking an already-revoked key is a no-op success.
    async fn revoke(&self, key: &str, expires_at: DateTime<Utc>) -> Result<(), AuthError>;

    async fn is_revoked(&self, key: &str) -> Result<bool, AuthError>;

    /// The only operation that removes entries. Returns how many were
    /// purged.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}
