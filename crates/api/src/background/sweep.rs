//! Periodic account maintenance.
//!
//! On every tick, lapsed subscriptions drop back to the free tier and
//! expired or revoked refresh sessions are deleted.

use std::time::Duration;

use chrono::Utc;
use companion_db::repositories::{AccountRepo, SessionRepo};
use companion_events::{names, EventBus, PlatformEvent};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the sweep loop until `cancel` is triggered.
///
/// The first sweep runs immediately.
pub async fn run(
    pool: PgPool,
    event_bus: std::sync::Arc<EventBus>,
    period: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = period.as_secs(), "Account sweep started");

    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Account sweep stopping");
                break;
            }
            _ = interval.tick() => sweep_once(&pool, &event_bus).await,
        }
    }
}

/// One pass of the sweep. Failures are logged and retried on the next tick.
pub async fn sweep_once(pool: &PgPool, event_bus: &EventBus) {
    match AccountRepo::expire_subscriptions(pool, Utc::now()).await {
        Ok(0) => tracing::debug!("Account sweep: no subscriptions lapsed"),
        Ok(expired) => {
            tracing::info!(expired, "Account sweep: subscriptions expired");
            event_bus.publish(
                PlatformEvent::new(names::SUBSCRIPTIONS_EXPIRED)
                    .with_payload(serde_json::json!({ "count": expired })),
            );
        }
        Err(e) => tracing::error!(error = %e, "Account sweep: subscription expiry failed"),
    }

    match SessionRepo::cleanup_expired(pool).await {
        Ok(0) => {}
        Ok(deleted) => tracing::info!(deleted, "Account sweep: purged stale sessions"),
        Err(e) => tracing::error!(error = %e, "Account sweep: session cleanup failed"),
    }
}
