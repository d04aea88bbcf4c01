pub mod account;
pub mod admin;
pub mod auth;
pub mod chat;
pub mod companions;
pub mod payments;
pub mod referrals;

use companion_core::error::CoreError;
use companion_core::types::DbId;
use companion_db::models::account::Account;
use companion_db::models::companion::Companion;
use companion_db::repositories::{AccountRepo, CompanionRepo};
use companion_db::DbPool;

use crate::error::AppResult;

pub(crate) async fn load_account(pool: &DbPool, id: DbId) -> AppResult<Account> {
    AccountRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Account", id }.into())
}

/// A companion visible to regular accounts. Unpublished profiles are 404.
pub(crate) async fn load_published_companion(pool: &DbPool, id: DbId) -> AppResult<Companion> {
    match CompanionRepo::find_by_id(pool, id).await? {
        Some(companion) if companion.is_published => Ok(companion),
        _ => Err(CoreError::NotFound {
            entity: "Companion",
            id,
        }
        .into()),
    }
}
