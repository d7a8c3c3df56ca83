use crate::application_port::AuthError;
use crate::domain_model::*;
use crate::domain_port::{NewSession, SessionStore};
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// In-process store for tests and single-instance deployments. DashMap
/// entry guards give `update_tokens` atomic pair replacement without an
/// outer mutex.
pub struct MemorySessionStore {
    sessions: DashMap<SessionId, Session>,
    session_ttl: chrono::Duration,
}

impl MemorySessionStore {
    pub fn new(session_ttl: chrono::Duration) -> Self {
        MemorySessionStore {
            sessions: DashMap::new(),
            session_ttl,
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
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
        self.sessions.insert(session.session_id, session.clone());
        Ok(session)
    }

    async fn get(&self, session_id: SessionId) -> Result<Option<Session>, AuthError> {
        let now = Utc::now();
        match self.sessions.get_mut(&session_id) {
            Some(mut entry) => {
                if entry.is_expired(now) {
                    return Ok(None);
                }
                entry.last_activity_at = now;
                Ok(Some(entry.value().clone()))
            }
            None => Ok(None),
        }
    }

    async fn update_tokens(
        &self,
        session_id: SessionId,
        access_token: AccessToken,
        refresh_token: RefreshToken,
    ) -> Result<bool, AuthError> {
        let now = Utc::now();
        match self.sessions.get_mut(&session_id) {
            Some(mut entry) => {
                if entry.is_expired(now) {
                    return Ok(false);
                }
                let session = entry.value_mut();
                session.current_access_token = access_token;
                session.current_refresh_token = refresh_token;
                session.last_activity_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, session_id: SessionId) -> Result<bool, AuthError> {
        Ok(self.sessions.remove(&session_id).is_some())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(now));
        Ok(before.saturating_sub(self.sessions.len()) as u64)
    }

    async fn list_by_subject(&self, subject_id: &SubjectId) -> Result<Vec<Session>, AuthError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .iter()
            .filter(|entry| entry.subject_id == *subject_id && !entry.is_expired(now))
            .map(|entry| entry.value().clone())
            .collect())
    }
}
