use crate::application_port::SessionAuthority;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Periodic maintenance: drives `SessionAuthority::sweep` on a timer so
/// expired sessions and revocation tombstones are purged off the request
/// path.
pub struct Sweeper {
    authority: Arc<dyn SessionAuthority>,
    interval: Duration,
    cancellation_token: CancellationToken,
}

impl Sweeper {
    pub fn new(
        authority: Arc<dyn SessionAuthority>,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            authority,
            interval,
            cancellation_token,
        }
    }

    async fn tick_once(&self) {
        match self.authority.sweep().await {
            Ok(0) => {}
            Ok(purged) => tracing::info!(purged, "sweep purged expired entries"),
            Err(e) => tracing::error!("Sweeper error: {:#?}", e),
        }
    }

    pub async fn run(&self) {
        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Sweeper shutting down...");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {
                    self.tick_once().await;
                }
            }
        }
    }
}
