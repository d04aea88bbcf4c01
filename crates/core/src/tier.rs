//! Subscription tiers and their chat-volume allowances.
//!
//! Tiers are stored as lowercase text in the `accounts.tier` column and
//! parsed with [`Tier::from_str`](std::str::FromStr) at the edges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Length of a paid subscription granted by an approved package request.
pub const SUBSCRIPTION_DAYS: i64 = 30;

/// Coarse subscription level gating chat volume and feature access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Basic,
    Premium,
    Vip,
}

impl Tier {
    /// All tiers in ascending order.
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Basic, Tier::Premium, Tier::Vip];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Basic => "basic",
            Tier::Premium => "premium",
            Tier::Vip => "vip",
        }
    }

    /// Whether this tier is bought through a package request.
    pub fn is_paid(self) -> bool {
        self != Tier::Free
    }

    /// Listed monthly price in taka, shown on the purchase overlay.
    pub fn monthly_price(self) -> i64 {
        match self {
            Tier::Free => 0,
            Tier::Basic => 299,
            Tier::Premium => 599,
            Tier::Vip => 999,
        }
    }

    /// Maximum user messages per UTC day, or `None` for unlimited.
    pub fn daily_message_limit(self) -> Option<u32> {
        match self {
            Tier::Free => Some(20),
            Tier::Basic => Some(200),
            Tier::Premium | Tier::Vip => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "basic" => Ok(Tier::Basic),
            "premium" => Ok(Tier::Premium),
            "vip" => Ok(Tier::Vip),
            other => Err(CoreError::Validation(format!(
                "Unknown tier '{other}'. Must be one of: free, basic, premium, vip"
            ))),
        }
    }
}

/// Expiry of a subscription that starts at `now`.
pub fn subscription_expiry(now: Timestamp) -> Timestamp {
    now + chrono::Duration::days(SUBSCRIPTION_DAYS)
}

/// Reject a new chat turn when the tier's daily allowance is used up.
pub fn check_message_allowance(tier: Tier, sent_today: u32) -> Result<(), CoreError> {
    match tier.daily_message_limit() {
        Some(limit) if sent_today >= limit => Err(CoreError::Forbidden(format!(
            "Daily message limit of {limit} reached for the {tier} tier"
        ))),
        _ => Ok(()),
    }
}
