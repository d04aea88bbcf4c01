//! Manual top-up requests: status machine, submission checks and the
//! fixed grant table applied on approval.
//!
//! A payment request is the user's claim of having sent money through a
//! mobile wallet. Nothing here verifies the claim; an admin reads the
//! transaction id and decides.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::credits::AccountSnapshot;
use crate::error::CoreError;
use crate::tier::{subscription_expiry, Tier};
use crate::types::{Credits, Timestamp};

/// Credit packs: minimum amount in taka and the credits it buys.
///
/// Ordered by ascending threshold.
pub const CREDIT_PACKS: [(i64, Credits); 4] = [(100, 100), (280, 300), (450, 500), (850, 1000)];

/// Longest accepted transaction id.
pub const MAX_TRANSACTION_ID_LEN: usize = 64;

/// Largest amount, in taka, a single request or referral discount may carry.
pub const MAX_AMOUNT: i64 = 1_000_000;

static MOBILE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\+?88)?01[3-9][0-9]{8}$").expect("mobile number pattern is valid")
});

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != PaymentStatus::Pending
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "approved" => Ok(PaymentStatus::Approved),
            "rejected" => Ok(PaymentStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid payment status '{other}'. Must be one of: pending, approved, rejected"
            ))),
        }
    }
}

/// Validate a status change. Only `pending -> approved` and
/// `pending -> rejected` exist; both targets are terminal.
pub fn transition(from: PaymentStatus, to: PaymentStatus) -> Result<PaymentStatus, CoreError> {
    match (from, to) {
        (PaymentStatus::Pending, PaymentStatus::Approved)
        | (PaymentStatus::Pending, PaymentStatus::Rejected) => Ok(to),
        _ => Err(CoreError::Conflict(format!(
            "Payment request cannot move from {from} to {to}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Kind / method
// ---------------------------------------------------------------------------

/// What the user claims to have paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Credits,
    Package,
}

impl PaymentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentKind::Credits => "credits",
            PaymentKind::Package => "package",
        }
    }
}

impl FromStr for PaymentKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credits" => Ok(PaymentKind::Credits),
            "package" => Ok(PaymentKind::Package),
            other => Err(CoreError::Validation(format!(
                "Invalid payment kind '{other}'. Must be one of: credits, package"
            ))),
        }
    }
}

/// Mobile wallet the money was sent through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Bkash,
    Nagad,
    Rocket,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Bkash => "bkash",
            PaymentMethod::Nagad => "nagad",
            PaymentMethod::Rocket => "rocket",
        }
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Fields of a submitted request that are checked before it is stored.
#[derive(Debug, Clone)]
pub struct Submission<'a> {
    pub kind: PaymentKind,
    pub amount: i64,
    pub package_tier: Option<Tier>,
    pub transaction_id: &'a str,
    pub sender_number: &'a str,
}

pub fn validate_submission(sub: &Submission<'_>) -> Result<(), CoreError> {
    if sub.amount <= 0 {
        return Err(CoreError::Validation("Amount must be positive".into()));
    }
    if sub.amount > MAX_AMOUNT {
        return Err(CoreError::Validation(format!(
            "Amount must not exceed {MAX_AMOUNT} taka"
        )));
    }
    match (sub.kind, sub.package_tier) {
        (PaymentKind::Package, None) => {
            return Err(CoreError::Validation(
                "Package requests must name a package_tier".into(),
            ))
        }
        (PaymentKind::Package, Some(tier)) if !tier.is_paid() => {
            return Err(CoreError::Validation(
                "The free tier cannot be purchased".into(),
            ))
        }
        (PaymentKind::Credits, Some(_)) => {
            return Err(CoreError::Validation(
                "Credit requests must not name a package_tier".into(),
            ))
        }
        _ => {}
    }
    let txn = sub.transaction_id.trim();
    if txn.is_empty() || txn.len() > MAX_TRANSACTION_ID_LEN {
        return Err(CoreError::Validation(format!(
            "Transaction id must be 1-{MAX_TRANSACTION_ID_LEN} characters"
        )));
    }
    if !MOBILE_NUMBER.is_match(sub.sender_number.trim()) {
        return Err(CoreError::Validation(format!(
            "'{}' is not a valid mobile number",
            sub.sender_number
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Grants
// ---------------------------------------------------------------------------

/// What an approved request gives the account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grant {
    pub credits: Credits,
    pub tier: Option<Tier>,
    pub subscription_expires_at: Option<Timestamp>,
}

/// Credits bought by `amount` taka: the highest pack threshold not above it.
pub fn credits_for_amount(amount: i64) -> Credits {
    CREDIT_PACKS
        .iter()
        .rev()
        .find(|(threshold, _)| amount >= *threshold)
        .map(|(_, credits)| *credits)
        .unwrap_or(0)
}

/// Declared amount plus referral discount, the value a grant is priced on.
pub fn gross_amount(amount: i64, discount_amount: i64) -> Result<i64, CoreError> {
    amount.checked_add(discount_amount).ok_or_else(|| {
        CoreError::Validation(format!(
            "Amount {amount} plus discount {discount_amount} is out of range"
        ))
    })
}

/// Compute the grant for an approved request.
///
/// `gross_amount` is the declared amount plus any referral discount, so a
/// coupon does not shrink the pack the user asked for.
pub fn compute_grant(
    kind: PaymentKind,
    gross_amount: i64,
    package_tier: Option<Tier>,
    now: Timestamp,
) -> Result<Grant, CoreError> {
    match kind {
        PaymentKind::Credits => Ok(Grant {
            credits: credits_for_amount(gross_amount),
            tier: None,
            subscription_expires_at: None,
        }),
        PaymentKind::Package => {
            let tier = package_tier.ok_or_else(|| {
                CoreError::Validation("Package request has no package_tier".into())
            })?;
            Ok(Grant {
                credits: 0,
                tier: Some(tier),
                subscription_expires_at: Some(subscription_expiry(now)),
            })
        }
    }
}

/// Apply an approval to an account record.
///
/// Approval of any payment also approves the account for platform access.
pub fn apply_grant(account: &mut AccountSnapshot, grant: &Grant) {
    account.credits += grant.credits;
    if let Some(tier) = grant.tier {
        account.tier = tier;
        account.is_premium = true;
        account.subscription_expires_at = grant.subscription_expires_at;
    }
    account.approved = true;
}
