use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{NewSession, RevocationStore, SessionStore};
use chrono::Utc;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Revocation entries are keyed by digest so raw token strings are never
/// persisted or logged.
fn revocation_key(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub struct RealSessionAuthority {
    token_codec: Arc<dyn TokenCodec>,
    session_store: Arc<dyn SessionStore>,
    revocation_store: Arc<dyn RevocationStore>,
    /// Serializes rotate/logout per session so the revoke-then-update pair
    /// of one attempt is never interleaved with another attempt on the same
    /// session. Stale entries are pruned during `sweep`.
    rotation_locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl RealSessionAuthority {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        session_store: Arc<dyn SessionStore>,
        revocation_store: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            token_codec,
            session_store,
            revocation_store,
            rotation_locks: DashMap::new(),
        }
    }

    fn session_lock(&self, session_id: SessionId) -> Arc<Mutex<()>> {
        self.rotation_locks
            .entry(session_id)
            .or_insert_with(Default::default)
            .clone()
    }

    /// Only a token that can still verify needs a tombstone; an expired or
    /// unverifiable one already fails validation on its own.
    async fn revoke_access_if_live(&self, token: &AccessToken) -> Result<(), AuthError> {
        match self.token_codec.verify_access_token(token).await {
            Ok(claims) => {
                self.revocation_store
                    .revoke(&revocation_key(&token.0), claims.expires_at)
                    .await
            }
            Err(AuthError::TokenExpired) => Ok(()),
            Err(e) => {
                warn!(error = %e, "stored access token no longer verifies; skipping tombstone");
                Ok(())
            }
        }
    }

    async fn revoke_refresh_if_live(&self, token: &RefreshToken) -> Result<(), AuthError> {
        match self.token_codec.verify_refresh_token(token).await {
            Ok(claims) => {
                self.revocation_store
                    .revoke(&revocation_key(&token.0), claims.expires_at)
                    .await
            }
            Err(AuthError::TokenExpired) => Ok(()),
            Err(e) => {
                warn!(error = %e, "stored refresh token no longer verifies; skipping tombstone");
                Ok(())
            }
        }
    }
}

#[async_trait::async_trait]
impl SessionAuthority for RealSessionAuthority {
    async fn login(&self, input: LoginInput) -> Result<SessionGrant, AuthError> {
        let LoginInput {
            subject_id,
            tenant_id,
            metadata,
        } = input;

        let pair = self
            .token_codec
            .issue_pair(&subject_id, &tenant_id, None)
            .await?;

        let session = self
            .session_store
            .create(NewSession {
                subject_id,
                tenant_id,
                access_token: pair.access_token.clone(),
                refresh_token: pair.refresh_token.clone(),
                metadata,
            })
            .await?;

        Ok(SessionGrant {
            session_id: session.session_id,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: (pair.access_token_expires_at - Utc::now()).num_seconds(),
        })
    }

    async fn complete_oauth(&self, info: OAuthUserInfo) -> Result<SessionGrant, AuthError> {
        let OAuthUserInfo {
            provider,
            external_id,
            tenant_id,
            profile,
        } = info;

        let subject_id = SubjectId::from_oauth(&provider, &external_id);
        let metadata = SessionMetadata::oauth(&provider, profile);

        self.login(LoginInput {
            subject_id,
            tenant_id,
            metadata,
        })
        .await
    }

    async fn validate(&self, token: &AccessToken) -> Result<TokenClaims, AuthError> {
        if self
            .revocation_store
            .is_revoked(&revocation_key(&token.0))
            .await?
        {
            return Err(AuthError::TokenRevoked);
        }
        self.token_codec.verify_access_token(token).await
    }

    async fn rotate(
        &self,
        refresh_token: &RefreshToken,
        session_id: SessionId,
    ) -> Result<TokenPair, AuthError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let session = self
            .session_store
            .get(session_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if self
            .revocation_store
            .is_revoked(&revocation_key(&refresh_token.0))
            .await?
        {
            return Err(AuthError::TokenRevoked);
        }

        let claims = self.token_codec.verify_refresh_token(refresh_token).await?;

        // A token that verifies but is not the session's current one is
        // either stale or was minted for a different session.
        if *refresh_token != session.current_refresh_token
            || claims.subject_id != session.subject_id
        {
            return Err(AuthError::TokenRevoked);
        }

        let pair = self
            .token_codec
            .issue_pair(&session.subject_id, &session.tenant_id, None)
            .await?;

        // Revoke before updating the store: a crash between the two steps
        // must leave the old pair dead, not silently valid.
        self.revoke_access_if_live(&session.current_access_token)
            .await?;
        self.revocation_store
            .revoke(&revocation_key(&refresh_token.0), claims.expires_at)
            .await?;

        let updated = self
            .session_store
            .update_tokens(
                session_id,
                pair.access_token.clone(),
                pair.refresh_token.clone(),
            )
            .await?;
        if !updated {
            return Err(AuthError::SessionNotFound);
        }

        Ok(pair)
    }

    async fn logout(&self, session_id: SessionId) -> Result<bool, AuthError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let Some(session) = self.session_store.get(session_id).await? else {
            return Ok(false);
        };

        self.revoke_access_if_live(&session.current_access_token)
            .await?;
        self.revoke_refresh_if_live(&session.current_refresh_token)
            .await?;

        let deleted = self.session_store.delete(session_id).await?;
        self.rotation_locks.remove(&session_id);
        Ok(deleted)
    }

    async fn sweep(&self) -> Result<u64, AuthError> {
        let now = Utc::now();
        let sessions = self.session_store.sweep_expired(now).await?;
        let revocations = self.revocation_store.sweep_expired(now).await?;
        self.rotation_locks
            .retain(|_, lock| Arc::strong_count(lock) > 1);
        if sessions + revocations > 0 {
            debug!(sessions, revocations, "sweep purged expired entries");
        }
        Ok(sessions + revocations)
    }
}
