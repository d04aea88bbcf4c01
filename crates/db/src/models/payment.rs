//! Payment request models (manual mobile-wallet top-ups).

use companion_core::types::{Credits, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `payment_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentRequest {
    pub id: DbId,
    pub account_id: DbId,
    pub kind: String,
    pub amount: i64,
    pub package_tier: Option<String>,
    pub method: String,
    pub sender_number: String,
    pub transaction_id: String,
    pub referral_code: Option<String>,
    pub discount_amount: i64,
    pub status: String,
    pub credits_granted: Option<Credits>,
    pub decided_by: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new request. Always starts `pending`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentRequest {
    pub account_id: DbId,
    pub kind: String,
    pub amount: i64,
    pub package_tier: Option<String>,
    pub method: String,
    pub sender_number: String,
    pub transaction_id: String,
    pub referral_code: Option<String>,
    pub discount_amount: i64,
}
