use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::credentials::ports::AuthServicePort;

/// Spawn the periodic purge of expired revocations and refresh credentials.
///
/// Runs every `period` until `shutdown` turns `true` or its sender is dropped.
/// A failed pass is logged and retried on the next tick.
pub fn spawn_maintenance(
    auth_service: Arc<dyn AuthServicePort>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match auth_service.purge_expired(Utc::now()).await {
                        Ok(report) => tracing::info!(
                            revocations = report.revocations,
                            refresh_credentials = report.refresh_credentials,
                            "Maintenance sweep finished"
                        ),
                        Err(e) => tracing::error!("Maintenance sweep failed: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Maintenance task stopping");
                        break;
                    }
                }
            }
        }
    })
}
