//! In-memory session store tests: id generation, fixed-TTL expiry,
//! coherent pair replacement, and sweeping.

use std::collections::HashSet;

use vestibule::domain_model::{AccessToken, RefreshToken, SessionMetadata, SubjectId, TenantId};
use vestibule::domain_port::{NewSession, SessionStore};
use vestibule::infra_memory::MemorySessionStore;

fn new_session(subject: &str, tenant: &str, n: u32) -> NewSession {
    NewSession {
        subject_id: SubjectId::new(subject),
        tenant_id: TenantId::new(tenant),
        access_token: AccessToken(format!("access-{}", n)),
        refresh_token: RefreshToken(format!("refresh-{}", n)),
        metadata: SessionMetadata::password(),
    }
}

#[tokio::test]
async fn session_ids_are_unique_across_ten_thousand_creates() {
    let store = MemorySessionStore::new(chrono::Duration::seconds(86_400));
    let mut seen = HashSet::new();
    for n in 0..10_000 {
        let session = store.create(new_session("u1", "orgA", n)).await.unwrap();
        assert!(seen.insert(session.session_id), "collision at {}", n);
    }
}

#[tokio::test]
async fn expired_sessions_read_as_missing() {
    let store = MemorySessionStore::new(chrono::Duration::seconds(-1));
    let session = store.create(new_session("u1", "orgA", 0)).await.unwrap();

    assert!(store.get(session.session_id).await.unwrap().is_none());
    assert!(
        !store
            .update_tokens(
                session.session_id,
                AccessToken("a".to_string()),
                RefreshToken("r".to_string()),
            )
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn get_touches_last_activity_but_never_the_expiry() {
    let store = MemorySessionStore::new(chrono::Duration::seconds(3600));
    let created = store.create(new_session("u1", "orgA", 0)).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let fetched = store.get(created.session_id).await.unwrap().unwrap();
    assert!(fetched.last_activity_at > created.last_activity_at);
    assert_eq!(fetched.expires_at, created.expires_at);
    assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn update_tokens_replaces_the_pair_as_one_unit() {
    let store = MemorySessionStore::new(chrono::Duration::seconds(3600));
    let session = store.create(new_session("u1", "orgA", 0)).await.unwrap();

    let updated = store
        .update_tokens(
            session.session_id,
            AccessToken("access-v2".to_string()),
            RefreshToken("refresh-v2".to_string()),
        )
        .await
        .unwrap();
    assert!(updated);

    let fetched = store.get(session.session_id).await.unwrap().unwrap();
    assert_eq!(fetched.current_access_token, AccessToken("access-v2".to_string()));
    assert_eq!(
        fetched.current_refresh_token,
        RefreshToken("refresh-v2".to_string())
    );
}

#[tokio::test]
async fn delete_is_idempotent() {
    let store = MemorySessionStore::new(chrono::Duration::seconds(3600));
    let session = store.create(new_session("u1", "orgA", 0)).await.unwrap();

    assert!(store.delete(session.session_id).await.unwrap());
    assert!(!store.delete(session.session_id).await.unwrap());
    assert!(store.get(session.session_id).await.unwrap().is_none());
}

#[tokio::test]
async fn sweep_removes_only_expired_records() {
    let live = MemorySessionStore::new(chrono::Duration::seconds(3600));
    live.create(new_session("u1", "orgA", 0)).await.unwrap();
    assert_eq!(live.sweep_expired(chrono::Utc::now()).await.unwrap(), 0);

    let dead = MemorySessionStore::new(chrono::Duration::seconds(-1));
    dead.create(new_session("u1", "orgA", 0)).await.unwrap();
    dead.create(new_session("u2", "orgA", 1)).await.unwrap();
    assert_eq!(dead.sweep_expired(chrono::Utc::now()).await.unwrap(), 2);
}

#[tokio::test]
async fn list_by_subject_filters_on_subject_and_liveness() {
    let store = MemorySessionStore::new(chrono::Duration::seconds(3600));
    store.create(new_session("u1", "orgA", 0)).await.unwrap();
    store.create(new_session("u1", "orgB", 1)).await.unwrap();
    store.create(new_session("u2", "orgA", 2)).await.unwrap();

    let sessions = store.list_by_subject(&SubjectId::new("u1")).await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert!(sessions.iter().all(|s| s.subject_id == SubjectId::new("u1")));

    assert!(
        store
            .list_by_subject(&SubjectId::new("nobody"))
            .await
            .unwrap()
            .is_empty()
    );
}
