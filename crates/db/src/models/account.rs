//! Account entity model and DTOs.

use std::collections::BTreeSet;

use companion_core::credits::AccountSnapshot;
use companion_core::error::CoreError;
use companion_core::roles::ROLE_ADMIN;
use companion_core::types::{Credits, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full account row from the `accounts` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`AccountResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub role: String,
    pub credits: Credits,
    pub tier: String,
    pub is_premium: bool,
    pub subscription_expires_at: Option<Timestamp>,
    pub unlocked_content: Vec<String>,
    pub approved: bool,
    pub age_verified_at: Option<Timestamp>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// The tracked record shared with clients.
    pub fn snapshot(&self) -> Result<AccountSnapshot, CoreError> {
        Ok(AccountSnapshot {
            id: self.id,
            display_name: self.display_name.clone(),
            credits: self.credits,
            tier: self.tier.parse()?,
            is_premium: self.is_premium,
            subscription_expires_at: self.subscription_expires_at,
            approved: self.approved,
            unlocked_content: self.unlocked_content.iter().cloned().collect::<BTreeSet<_>>(),
        })
    }

    pub fn to_response(&self) -> Result<AccountResponse, CoreError> {
        Ok(AccountResponse {
            email: self.email.clone(),
            role: self.role.clone(),
            age_verified_at: self.age_verified_at,
            is_active: self.is_active,
            created_at: self.created_at,
            account: self.snapshot()?,
        })
    }
}

/// Safe account representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    #[serde(flatten)]
    pub account: AccountSnapshot,
    pub email: String,
    pub role: String,
    pub age_verified_at: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a new account.
#[derive(Debug, Deserialize)]
pub struct CreateAccount {
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub role: String,
}

/// Credit/tier grant applied when a payment request is approved.
#[derive(Debug, Clone)]
pub struct AccountGrant {
    pub credits: Credits,
    pub tier: Option<String>,
    pub subscription_expires_at: Option<Timestamp>,
}
