/// Example demonstrating the full credential lifecycle against the
/// in-memory stores: login, validate, rotate, tenant check, logout.
///
/// $ cargo run --bin authority_demo
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use vestibule::application_impl::{
    JwtHs256Codec, RealSessionAuthority, TenantGuard, TokenCodecConfig,
};
use vestibule::application_port::{LoginInput, SessionAuthority, TokenCodec};
use vestibule::domain_model::{SessionMetadata, SubjectId, TenantId};
use vestibule::domain_port::{RevocationStore, SessionStore};
use vestibule::infra_memory::{MemoryRevocationStore, MemorySessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::new("authority_demo=debug,vestibule=debug");

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(TokenCodecConfig {
        issuer: "vestibule.auth".to_string(),
        audience: "task-client".to_string(),
        access_ttl: chrono::Duration::seconds(900),
        refresh_ttl: chrono::Duration::seconds(604_800),
        leeway_secs: 5,
        access_secret: b"demo-access-secret".to_vec(),
        refresh_secret: b"demo-refresh-secret".to_vec(),
    }));
    let session_store: Arc<dyn SessionStore> =
        Arc::new(MemorySessionStore::new(chrono::Duration::seconds(86_400)));
    let revocation_store: Arc<dyn RevocationStore> = Arc::new(MemoryRevocationStore::new());

    let authority = RealSessionAuthority::new(token_codec.clone(), session_store, revocation_store);
    let tenant_guard = TenantGuard::new(token_codec);

    let grant = authority
        .login(LoginInput {
            subject_id: SubjectId::new("u1"),
            tenant_id: TenantId::new("orgA"),
            metadata: SessionMetadata::password(),
        })
        .await?;
    println!("login -> session {}", grant.session_id);

    let claims = authority.validate(&grant.access_token).await?;
    println!("validate -> subject {} tenant {:?}", claims.subject_id, claims.tenant_id);

    tenant_guard
        .authorize(&grant.access_token, &TenantId::new("orgA"))
        .await?;
    println!("authorize orgA -> ok");

    let denied = tenant_guard
        .authorize(&grant.access_token, &TenantId::new("orgB"))
        .await;
    println!("authorize orgB -> {:?}", denied.unwrap_err());

    let pair = authority
        .rotate(&grant.refresh_token, grant.session_id)
        .await?;
    println!("rotate -> new pair issued");

    let stale = authority.validate(&grant.access_token).await;
    println!("validate old access -> {:?}", stale.unwrap_err());

    let reused = authority.rotate(&grant.refresh_token, grant.session_id).await;
    println!("rotate with consumed refresh -> {:?}", reused.unwrap_err());

    let deleted = authority.logout(grant.session_id).await?;
    println!("logout -> {}", deleted);

    let again = authority.rotate(&pair.refresh_token, grant.session_id).await;
    println!("rotate after logout -> {:?}", again.unwrap_err());

    Ok(())
}
