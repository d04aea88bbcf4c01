//! Credit ledger rules for gated gallery items and voice replies.
//!
//! [`AccountSnapshot`] is the account record as both sides see it: the
//! server serializes it from the `accounts` row and the client keeps an
//! optimistic local copy of it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::gallery::ContentKey;
use crate::tier::Tier;
use crate::types::{Credits, DbId, Timestamp};

/// Credits charged for one synthesized voice reply.
pub const VOICE_REPLY_COST: Credits = 5;

/// Account fields relevant to credit gating and reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: DbId,
    pub display_name: Option<String>,
    pub credits: Credits,
    pub tier: Tier,
    pub is_premium: bool,
    pub subscription_expires_at: Option<Timestamp>,
    pub approved: bool,
    #[serde(default)]
    pub unlocked_content: BTreeSet<String>,
}

impl AccountSnapshot {
    pub fn owns(&self, key: &ContentKey) -> bool {
        self.unlocked_content.contains(&key.to_string())
    }
}

/// Check that `balance` covers `cost`.
///
/// This is a plain numeric comparison. It does not look at whether the
/// content is already owned, so a repeat unlock passes and charges again.
pub fn check_unlock(balance: Credits, cost: Credits) -> Result<(), CoreError> {
    if cost < 0 {
        return Err(CoreError::Validation(format!(
            "Unlock cost must not be negative (got {cost})"
        )));
    }
    if balance < cost {
        return Err(CoreError::InsufficientCredits {
            required: cost,
            available: balance,
        });
    }
    Ok(())
}

/// Apply a successful unlock: debit `cost` and add `key` to the unlocked set.
///
/// The set only grows; a key already present stays a single entry.
pub fn apply_unlock(account: &mut AccountSnapshot, key: &ContentKey, cost: Credits) {
    account.credits -= cost;
    account.unlocked_content.insert(key.to_string());
}
