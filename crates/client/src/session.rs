//! Client session state: current view, overlays and the optimistic
//! account copy.
//!
//! All mutation goes through [`ClientSession`]. The lock is never held
//! across a remote call, so an unlock and a reconcile can interleave; the
//! last write to local state wins.

use std::sync::Arc;

use companion_core::auth_messages::AuthFailure;
use companion_core::credits::{apply_unlock, check_unlock, AccountSnapshot};
use companion_core::error::CoreError;
use companion_core::gallery::ContentKey;
use companion_core::navigation::{self, AuthEvent, NavAction, Overlay, Overlays, View};
use companion_core::reconcile::{reconcile, ReconcileOutcome, TRACKED_FIELDS};
use companion_core::types::{Credits, DbId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::cache::LocalCache;
use crate::error::ClientError;
use crate::remote::AccountRemote;

const KEY_VIEW: &str = "view";
const KEY_OVERLAYS: &str = "overlays";
const KEY_SIGNED_IN: &str = "signed_in";
const KEY_IS_ADMIN: &str = "is_admin";
const KEY_ACCOUNT: &str = "account";
const KEY_SELECTED_COMPANION: &str = "selected_companion";

/// Everything the client keeps between screens.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalState {
    pub view: View,
    pub overlays: Overlays,
    pub signed_in: bool,
    pub is_admin: bool,
    pub account: Option<AccountSnapshot>,
    pub selected_companion: Option<DbId>,
}

impl Default for LocalState {
    fn default() -> Self {
        Self {
            view: View::Landing,
            overlays: Overlays::new(),
            signed_in: false,
            is_admin: false,
            account: None,
            selected_companion: None,
        }
    }
}

impl LocalState {
    /// Rebuild from cached entries. Unreadable entries fall back to defaults.
    fn from_cache(cache: &LocalCache) -> Self {
        let defaults = Self::default();
        Self {
            view: cached(cache, KEY_VIEW).unwrap_or(defaults.view),
            overlays: cached(cache, KEY_OVERLAYS).unwrap_or(defaults.overlays),
            signed_in: cached(cache, KEY_SIGNED_IN).unwrap_or(defaults.signed_in),
            is_admin: cached(cache, KEY_IS_ADMIN).unwrap_or(defaults.is_admin),
            account: cached(cache, KEY_ACCOUNT).unwrap_or(defaults.account),
            selected_companion: cached(cache, KEY_SELECTED_COMPANION)
                .unwrap_or(defaults.selected_companion),
        }
    }

    fn write_to(&self, cache: &mut LocalCache) -> Result<(), ClientError> {
        store(cache, KEY_VIEW, &self.view)?;
        store(cache, KEY_OVERLAYS, &self.overlays)?;
        store(cache, KEY_SIGNED_IN, &self.signed_in)?;
        store(cache, KEY_IS_ADMIN, &self.is_admin)?;
        store(cache, KEY_ACCOUNT, &self.account)?;
        store(cache, KEY_SELECTED_COMPANION, &self.selected_companion)
    }
}

fn cached<T: DeserializeOwned>(cache: &LocalCache, key: &str) -> Option<T> {
    let raw = cache.get(key)?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring unreadable cache entry");
            None
        }
    }
}

fn store<T: Serialize>(cache: &mut LocalCache, key: &str, value: &T) -> Result<(), ClientError> {
    let raw = serde_json::to_string(value)
        .map_err(|e| ClientError::Cache(format!("Failed to encode '{key}': {e}")))?;
    cache.set(key, raw)
}

struct Inner {
    state: LocalState,
    cache: LocalCache,
}

impl Inner {
    /// Mirror the state to disk. A failed write only costs the offline copy.
    fn persist(&mut self) {
        if let Err(e) = self.state.write_to(&mut self.cache) {
            tracing::warn!(
                path = %self.cache.path().display(),
                error = %e,
                "Failed to persist client state"
            );
        }
    }
}

/// One signed-in (or signed-out) client.
pub struct ClientSession {
    remote: Arc<dyn AccountRemote>,
    inner: Mutex<Inner>,
}

impl ClientSession {
    /// Rehydrate a session from the local cache.
    pub fn restore(remote: Arc<dyn AccountRemote>, cache: LocalCache) -> Self {
        let state = LocalState::from_cache(&cache);
        tracing::info!(
            view = ?state.view,
            signed_in = state.signed_in,
            has_account = state.account.is_some(),
            "Client session restored"
        );
        Self {
            remote,
            inner: Mutex::new(Inner { state, cache }),
        }
    }

    pub async fn state(&self) -> LocalState {
        self.inner.lock().await.state.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.inner.lock().await.state.signed_in
    }

    /// Apply a sign-in or sign-out. Both force the view and close overlays.
    ///
    /// Signing out also drops the account copy and companion selection.
    pub async fn on_auth_event(&self, event: AuthEvent) -> View {
        let mut inner = self.inner.lock().await;
        let view = navigation::on_auth_event(event);
        match event {
            AuthEvent::SignedIn => {
                inner.state.signed_in = true;
                inner.state.view = view;
                inner.state.overlays.clear();
            }
            AuthEvent::SignedOut => inner.state = LocalState::default(),
        }
        tracing::info!(?event, ?view, "Auth state changed");
        inner.persist();
        view
    }

    pub async fn navigate(&self, action: NavAction) -> Result<View, ClientError> {
        let mut inner = self.inner.lock().await;
        let view = navigation::next_view(inner.state.view, action, inner.state.is_admin)?;
        if view != inner.state.view {
            tracing::debug!(from = ?inner.state.view, to = ?view, ?action, "Navigated");
            inner.state.view = view;
            inner.persist();
        }
        Ok(view)
    }

    pub async fn open_overlay(&self, overlay: Overlay) {
        let mut inner = self.inner.lock().await;
        if inner.state.overlays.insert(overlay) {
            inner.persist();
        }
    }

    pub async fn close_overlay(&self, overlay: Overlay) {
        let mut inner = self.inner.lock().await;
        if inner.state.overlays.remove(&overlay) {
            inner.persist();
        }
    }

    pub async fn set_selected_companion(&self, companion_id: Option<DbId>) {
        let mut inner = self.inner.lock().await;
        if inner.state.selected_companion != companion_id {
            inner.state.selected_companion = companion_id;
            inner.persist();
        }
    }

    /// Spend `cost` credits to unlock `key`.
    ///
    /// The balance check runs against the local copy. When it fails, the
    /// credit purchase overlay opens and nothing is sent. Otherwise the
    /// remote write is issued and, only once it succeeds, the same change
    /// is applied locally. Owning `key` already does not prevent a charge.
    pub async fn attempt_unlock(
        &self,
        key: &ContentKey,
        cost: Credits,
    ) -> Result<AccountSnapshot, ClientError> {
        {
            let mut inner = self.inner.lock().await;
            let balance = inner
                .state
                .account
                .as_ref()
                .map(|account| account.credits)
                .ok_or(ClientError::Auth(AuthFailure::SessionExpired))?;

            match check_unlock(balance, cost) {
                Ok(()) => {}
                Err(CoreError::InsufficientCredits {
                    required,
                    available,
                }) => {
                    inner.state.overlays.insert(Overlay::CreditPurchase);
                    inner.persist();
                    return Err(ClientError::InsufficientCredits {
                        required,
                        available,
                    });
                }
                Err(e) => return Err(ClientError::Invalid(e.to_string())),
            }
        }

        if let Err(e) = self.remote.debit_and_unlock(key, cost).await {
            tracing::warn!(content_key = %key, cost, error = %e, "Unlock rejected by store");
            return Err(ClientError::UnlockFailed(e));
        }

        let mut inner = self.inner.lock().await;
        let account = inner
            .state
            .account
            .as_mut()
            .ok_or(ClientError::Auth(AuthFailure::SessionExpired))?;
        apply_unlock(account, key, cost);
        let updated = account.clone();
        tracing::info!(content_key = %key, cost, balance = updated.credits, "Content unlocked");
        inner.persist();
        Ok(updated)
    }

    /// Pull the remote account and let it win on any tracked difference.
    ///
    /// A fetch that lands after sign-out is discarded.
    pub async fn reconcile(&self) -> Result<ReconcileOutcome, ClientError> {
        let remote = self
            .remote
            .fetch_account()
            .await
            .map_err(ClientError::from_fetch)?;

        let mut inner = self.inner.lock().await;
        if !inner.state.signed_in {
            return Ok(ReconcileOutcome::Unchanged);
        }

        let role_changed = inner.state.is_admin != remote.is_admin;
        inner.state.is_admin = remote.is_admin;

        let outcome = match inner.state.account.as_mut() {
            Some(local) => reconcile(local, remote.account),
            None => {
                inner.state.account = Some(remote.account);
                ReconcileOutcome::Replaced {
                    changed: TRACKED_FIELDS.to_vec(),
                }
            }
        };

        if let ReconcileOutcome::Replaced { changed } = &outcome {
            tracing::info!(?changed, "Local account replaced by remote record");
        }
        if role_changed || outcome != ReconcileOutcome::Unchanged {
            inner.persist();
        }
        Ok(outcome)
    }
}
