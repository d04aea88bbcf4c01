//! Shared query parameter types for API handlers.

use serde::Deserialize;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// `?limit=&offset=`.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

// Query strings carry no type hints, so paginated filters repeat the
// limit/offset fields instead of using `#[serde(flatten)]`.

/// `GET /admin/payments?status=&limit=&offset=`.
#[derive(Debug, Deserialize)]
pub struct PaymentListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaymentListParams {
    pub fn page(&self) -> PaginationParams {
        PaginationParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// `GET /admin/accounts?pending_only=&limit=&offset=`.
#[derive(Debug, Deserialize)]
pub struct AccountListParams {
    #[serde(default)]
    pub pending_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AccountListParams {
    pub fn page(&self) -> PaginationParams {
        PaginationParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// `GET /admin/events?event_type=&limit=`.
#[derive(Debug, Deserialize)]
pub struct EventListParams {
    pub event_type: Option<String>,
    pub limit: Option<i64>,
}

/// `GET /admin/referrals/transactions?referral_id=`.
#[derive(Debug, Deserialize)]
pub struct TransactionListParams {
    pub referral_id: Option<i64>,
}
