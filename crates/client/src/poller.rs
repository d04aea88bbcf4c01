//! Fixed-interval reconciliation against the account store.

use std::sync::Arc;
use std::time::Duration;

use companion_core::navigation::AuthEvent;
use companion_core::reconcile::ReconcileOutcome;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::session::ClientSession;

/// Reconcile `session` every `interval` until `cancel` is triggered.
///
/// Ticks are skipped while signed out. Fetch failures are logged and the
/// next tick tries again. An authentication rejection signs the session
/// out.
pub async fn run(session: Arc<ClientSession>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_ms = interval.as_millis() as u64, "Reconciliation poller started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reconciliation poller stopping");
                break;
            }
            _ = ticker.tick() => {
                if !session.is_signed_in().await {
                    continue;
                }
                match session.reconcile().await {
                    Ok(ReconcileOutcome::Unchanged) => {
                        tracing::trace!("Reconcile: no changes");
                    }
                    Ok(ReconcileOutcome::Replaced { .. }) => {}
                    Err(ClientError::Auth(failure)) => {
                        tracing::warn!(code = failure.code(), "Reconcile: session rejected, signing out");
                        session.on_auth_event(AuthEvent::SignedOut).await;
                    }
                    Err(e) => tracing::warn!(error = %e, "Reconcile failed"),
                }
            }
        }
    }
}
