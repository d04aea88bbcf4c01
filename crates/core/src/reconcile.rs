//! Last-remote-wins reconciliation of the local account copy.
//!
//! A fixed set of fields is compared; if any one differs the whole local
//! copy is replaced by the remote record. There is no merge and no
//! detection of a local change still in flight.

use serde::Serialize;

use crate::credits::AccountSnapshot;

/// Fields compared on every poll.
pub const TRACKED_FIELDS: [&str; 6] = [
    "credits",
    "tier",
    "is_premium",
    "subscription_expires_at",
    "display_name",
    "approved",
];

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Unchanged,
    Replaced { changed: Vec<&'static str> },
}

/// Names of tracked fields whose values differ between the two records.
pub fn differing_fields(local: &AccountSnapshot, remote: &AccountSnapshot) -> Vec<&'static str> {
    let checks = [
        local.credits != remote.credits,
        local.tier != remote.tier,
        local.is_premium != remote.is_premium,
        local.subscription_expires_at != remote.subscription_expires_at,
        local.display_name != remote.display_name,
        local.approved != remote.approved,
    ];
    TRACKED_FIELDS
        .iter()
        .zip(checks)
        .filter_map(|(name, differs)| differs.then_some(*name))
        .collect()
}

/// Replace `local` with `remote` when any tracked field differs.
pub fn reconcile(local: &mut AccountSnapshot, remote: AccountSnapshot) -> ReconcileOutcome {
    let changed = differing_fields(local, &remote);
    if changed.is_empty() {
        return ReconcileOutcome::Unchanged;
    }
    *local = remote;
    ReconcileOutcome::Replaced { changed }
}
