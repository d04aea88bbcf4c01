//! `companion-client` -- headless session that keeps the local account
//! copy in sync with the server.
//!
//! Restores the cached session, loads the account once and then polls
//! until Ctrl+C.
//!
//! # Environment variables
//!
//! | Variable                     | Required | Default                 |
//! |------------------------------|----------|-------------------------|
//! | `COMPANION_ACCESS_TOKEN`     | yes      | --                      |
//! | `COMPANION_API_URL`          | no       | `http://localhost:3000` |
//! | `COMPANION_POLL_INTERVAL_MS` | no       | `3000`                  |
//! | `COMPANION_CACHE_PATH`       | no       | `companion-cache.json`  |

use std::sync::Arc;

use companion_client::{poller, ClientConfig, ClientSession, HttpRemote, LocalCache};
use companion_core::navigation::AuthEvent;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "companion_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let token = std::env::var("COMPANION_ACCESS_TOKEN").unwrap_or_else(|_| {
        tracing::error!("COMPANION_ACCESS_TOKEN environment variable is required");
        std::process::exit(1);
    });

    let config = ClientConfig::from_env();
    tracing::info!(
        base_url = %config.base_url,
        cache = %config.cache_path.display(),
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Starting companion-client",
    );

    let cache = LocalCache::open(&config.cache_path).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to open local cache");
        std::process::exit(1);
    });
    let remote = Arc::new(HttpRemote::new(&config, token));
    let session = Arc::new(ClientSession::restore(remote, cache));

    if !session.is_signed_in().await {
        session.on_auth_event(AuthEvent::SignedIn).await;
    }
    match session.reconcile().await {
        Ok(_) => {
            if let Some(account) = session.state().await.account {
                tracing::info!(
                    account_id = account.id,
                    credits = account.credits,
                    tier = %account.tier,
                    "Account loaded"
                );
            }
        }
        Err(e) => tracing::warn!(error = %e, "Initial account load failed"),
    }

    let cancel = CancellationToken::new();
    let poll = tokio::spawn(poller::run(session, config.poll_interval, cancel.clone()));

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
    }
    cancel.cancel();
    let _ = poll.await;
    tracing::info!("companion-client stopped");
}
