//! Influencer referral codes and the commission ledger.

use companion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `referrals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Referral {
    pub id: DbId,
    pub code: String,
    pub influencer_name: String,
    pub commission_rate_pct: i32,
    pub discount_amount: i64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a referral. `code` must already be normalized.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReferral {
    pub code: String,
    pub influencer_name: String,
    pub commission_rate_pct: i32,
    pub discount_amount: i64,
}

/// A row from the `referral_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReferralTransaction {
    pub id: DbId,
    pub referral_id: DbId,
    pub payment_request_id: DbId,
    pub account_id: DbId,
    pub amount: i64,
    pub commission_amount: i64,
    pub created_at: Timestamp,
}
