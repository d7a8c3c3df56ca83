use crate::application_port::AuthError;
use crate::domain_model::*;
use crate::domain_port::{NewSession, SessionStore};
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Sessions as single JSON values under `{prefix}:session:{id}`, expired
/// natively by Redis TTLs. One value per session means every write replaces
/// the whole record, so a reader never observes a half-rotated pair.
pub struct RedisSessionStore {
    conn: ConnectionManager,
    prefix: String,
    session_ttl: chrono::Duration,
}

impl RedisSessionStore {
    pub fn new(
        conn: redis::aio::ConnectionManager,
        prefix: impl Into<String>,
        session_ttl: chrono::Duration,
    ) -> Self {
        RedisSessionStore {
            conn,
            prefix: prefix.into(),
            session_ttl,
        }
    }

    fn key(&self, session_id: SessionId) -> String {
        format!("{}:session:{}", self.prefix, session_id)
    }

    fn ttl_secs(until: DateTime<Utc>) -> u64 {
        let now = Utc::now();
        let secs = (until - now).num_seconds();
        if secs <= 0 { 1 } else { secs as u64 }
    }

    fn encode(session: &Session) -> Result<String, AuthError> {
        serde_json::to_string(session).map_err(|e| AuthError::Internal(e.to_string()))
    }

    fn decode(raw: &str) -> Result<Session, AuthError> {
        serde_json::from_str(raw).map_err(|e| AuthError::Store(e.to_string()))
    }

    /// `SET … XX KEEPTTL`: replace the record in place, only if it still
    /// exists, without extending its fixed expiry.
    async fn replace_keep_ttl(&self, key: &str, session: &Session) -> Result<bool, AuthError> {
        let raw = Self::encode(session)?;
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(raw)
            .arg("XX")
            .arg("KEEPTTL")
            .query_async(&mut conn)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(reply.is_some())
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, new: NewSession) -> Result<Session, AuthError> {
        let now = Utc::now();
        let session = Session {
            session_id: SessionId::generate(),
            subject_id: new.subject_id,
            tenant_id: new.tenant_id,
            current_access_token: new.access_token,
            current_refresh_token: new.refresh_token,
            created_at: now,
            last_activity_at: now,
            expires_at: now + self.session_ttl,
            metadata: new.metadata,
        };
        let key = self.key(session.session_id);
        let raw = Self::encode(&session)?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, raw, Self::ttl_secs(session.expires_at))
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(session)
    }

    async fn get(&self, session_id: SessionId) -> Result<Option<Session>, AuthError> {
        let key = self.key(session_id);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        let mut session = Self::decode(&raw)?;
        let now = Utc::now();
        // The Redis TTL normally removes expired records; the record-level
        // check covers clock drift between writer and store.
        if session.is_expired(now) {
            return Ok(None);
        }
        session.last_activity_at = now;
        self.replace_keep_ttl(&key, &session).await?;
        Ok(Some(session))
    }

    async fn update_tokens(
        &self,
        session_id: SessionId,
        access_token: AccessToken,
        refresh_token: RefreshToken,
    ) -> Result<bool, AuthError> {
        let key = self.key(session_id);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let Some(raw) = raw else {
            return Ok(false);
        };

        let mut session = Self::decode(&raw)?;
        let now = Utc::now();
        if session.is_expired(now) {
            return Ok(false);
        }
        session.current_access_token = access_token;
        session.current_refresh_token = refresh_token;
        session.last_activity_at = now;
        self.replace_keep_ttl(&key, &session).await
    }

    async fn delete(&self, session_id: SessionId) -> Result<bool, AuthError> {
        let key = self.key(session_id);
        let mut conn = self.conn.clone();
        let removed: i64 = conn
            .del(&key)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(removed > 0)
    }

    async fn sweep_expired(&self, _now: DateTime<Utc>) -> Result<u64, AuthError> {
        // Redis TTLs expire records natively; nothing to purge by hand.
        Ok(0)
    }

    async fn list_by_subject(&self, subject_id: &SubjectId) -> Result<Vec<Session>, AuthError> {
        let pattern = format!("{}:session:*", self.prefix);
        let mut scan_conn = self.conn.clone();
        let mut keys = Vec::new();
        {
            let mut iter = scan_conn
                .scan_match::<_, String>(&pattern)
                .await
                .map_err(|e| AuthError::Store(e.to_string()))?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        let now = Utc::now();
        let mut conn = self.conn.clone();
        let mut sessions = Vec::new();
        for key in keys {
            let raw: Option<String> = conn
                .get(&key)
                .await
                .map_err(|e| AuthError::Store(e.to_string()))?;
            if let Some(raw) = raw {
                let session = Self::decode(&raw)?;
                if session.subject_id == *subject_id && !session.is_expired(now) {
                    sessions.push(session);
                }
            }
        }
        Ok(sessions)
    }
}
