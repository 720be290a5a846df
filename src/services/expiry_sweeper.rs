use crate::{db::Database, error::Result, services::hold_service::HoldService};
use std::sync::Arc;

/// Time-driven counterpart of the request path: finds active holds whose
/// deadline passed and feeds them to the hold manager's release path.
pub struct ExpirySweeper {
    db: Database,
    holds: HoldService,
    interval_secs: u64,
}

impl ExpirySweeper {
    pub fn new(db: Database, holds: HoldService, interval_secs: u64) -> Self {
        Self {
            db,
            holds,
            interval_secs,
        }
    }

    /// Start the periodic sweep loop.
    pub async fn start(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                match self.sweep_once().await {
                    Ok(released) if released > 0 => {
                        tracing::info!("Expiry sweep released {} hold(s)", released);
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::error!("Expiry sweep failed: {}", err);
                    }
                }

                tokio::time::sleep(tokio::time::Duration::from_secs(self.interval_secs)).await;
            }
        });
    }

    /// One sweep pass. The scan takes no locks; every candidate is
    /// re-checked under lock by the release path, so a hold converted
    /// between scan and release is silently skipped. A failing hold is
    /// logged and the pass continues.
    pub async fn sweep_once(&self) -> Result<u64> {
        let stale = self.db.list_expired_active_holds().await?;
        let mut released = 0u64;

        for hold in stale {
            match self.holds.release_expired_hold(&hold).await {
                Ok(true) => released += 1,
                Ok(false) => {} // used or already expired since the scan
                Err(err) => {
                    tracing::warn!("Failed to release expired hold {}: {}", hold.id, err);
                }
            }
        }

        Ok(released)
    }
}
