use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::server::Sweeper;
use crate::settings::Settings;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Server {
    pub authority: Arc<dyn SessionAuthority>,
    pub tenant_guard: Arc<TenantGuard>,
    pub session_store: Arc<dyn SessionStore>,
    sweeper_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        if settings.tokens.signing_algorithm != "HS256" {
            return Err(anyhow::anyhow!(
                "Unsupported signing algorithm: {}",
                settings.tokens.signing_algorithm
            ));
        }

        let access_secret = std::env::var("VESTIBULE_ACCESS_SECRET")
            .unwrap_or_else(|_| "dev-access-secret".to_string())
            .into_bytes();
        let refresh_secret = std::env::var("VESTIBULE_REFRESH_SECRET")
            .unwrap_or_else(|_| "dev-refresh-secret".to_string())
            .into_bytes();

        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(TokenCodecConfig {
            issuer: settings.tokens.issuer.clone(),
            audience: settings.tokens.audience.clone(),
            access_ttl: chrono::Duration::seconds(settings.tokens.access_ttl_seconds),
            refresh_ttl: chrono::Duration::seconds(settings.tokens.refresh_ttl_seconds),
            leeway_secs: settings.tokens.clock_skew_seconds,
            access_secret,
            refresh_secret,
        }));

        let session_ttl = chrono::Duration::seconds(settings.session.ttl_seconds);
        let (session_store, revocation_store): (Arc<dyn SessionStore>, Arc<dyn RevocationStore>) =
            match settings.store.backend.as_str() {
                "memory" => (
                    Arc::new(MemorySessionStore::new(session_ttl)),
                    Arc::new(MemoryRevocationStore::new()),
                ),
                "redis" => {
                    let redis_client = redis::Client::open(settings.store.redis_url.as_str())?;
                    let redis_manager = redis_client.get_connection_manager().await?;
                    (
                        Arc::new(RedisSessionStore::new(
                            redis_manager.clone(),
                            settings.store.key_prefix.clone(),
                            session_ttl,
                        )),
                        Arc::new(RedisRevocationStore::new(
                            redis_manager,
                            settings.store.key_prefix.clone(),
                        )),
                    )
                }
                other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
            };

        let authority: Arc<dyn SessionAuthority> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeSessionAuthority::new()),
            "real" => Arc::new(RealSessionAuthority::new(
                token_codec.clone(),
                session_store.clone(),
                revocation_store.clone(),
            )),
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };

        let tenant_guard = Arc::new(TenantGuard::new(token_codec.clone()));

        let cancel = CancellationToken::new();
        let sweeper = Sweeper::new(
            authority.clone(),
            Duration::from_secs(settings.sweep.interval_seconds),
            cancel.clone(),
        );
        let sweeper_handle = tokio::spawn(async move {
            sweeper.run().await;
        });

        info!("server started");

        Ok(Self {
            authority,
            tenant_guard,
            session_store,
            sweeper_handle: Mutex::new(Some(sweeper_handle)),
            cancel,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        if let Ok(mut lock) = self.sweeper_handle.lock() {
            if let Some(handle) = lock.take() {
                let r = handle.await;
                info!("sweeper handle dropped: {:?}", r);
            }
        }
    }
}
