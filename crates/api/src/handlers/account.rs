//! Handlers for the caller's own account (`/account`).

use axum::extract::State;
use axum::Json;
use companion_core::credits::{check_unlock, AccountSnapshot};
use companion_core::error::CoreError;
use companion_core::gallery::ContentKey;
use companion_core::types::DbId;
use companion_db::models::account::AccountResponse;
use companion_db::repositories::AccountRepo;
use companion_events::{names, PlatformEvent};
use serde::Deserialize;

use super::{load_account, load_published_companion};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireApproved;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_DISPLAY_NAME_CHARS: usize = 60;

#[derive(Debug, Deserialize)]
pub struct UpdateNameRequest {
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub companion_id: DbId,
    pub item_id: String,
}

/// GET /api/v1/account
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let account = load_account(&state.pool, auth_user.account_id).await?;
    Ok(Json(DataResponse {
        data: account.to_response()?,
    }))
}

/// PUT /api/v1/account/name
pub async fn update_name(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<UpdateNameRequest>,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let name = input.display_name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Display name must not be empty".into()).into());
    }
    if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(CoreError::Validation(format!(
            "Display name exceeds {MAX_DISPLAY_NAME_CHARS} characters"
        ))
        .into());
    }

    let account = AccountRepo::update_display_name(&state.pool, auth_user.account_id, name)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Account",
            id: auth_user.account_id,
        })?;
    Ok(Json(DataResponse {
        data: account.to_response()?,
    }))
}

/// POST /api/v1/account/age-verification
pub async fn verify_age(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let account = AccountRepo::verify_age(&state.pool, auth_user.account_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Account",
            id: auth_user.account_id,
        })?;
    Ok(Json(DataResponse {
        data: account.to_response()?,
    }))
}

/// POST /api/v1/account/unlocks
///
/// Spends the item's credit cost and records it as unlocked. Unlocking an
/// item the caller already owns charges again.
pub async fn unlock(
    State(state): State<AppState>,
    RequireApproved(account): RequireApproved,
    Json(input): Json<UnlockRequest>,
) -> AppResult<Json<DataResponse<AccountSnapshot>>> {
    let companion = load_published_companion(&state.pool, input.companion_id).await?;
    let item = companion
        .find_item(&input.item_id)
        .ok_or_else(|| companion.item_not_found(&input.item_id))?;
    if !item.exclusive {
        return Err(AppError::BadRequest(format!(
            "Gallery item '{}' is not exclusive content",
            item.id
        )));
    }

    let cost = item.unlock_cost();
    check_unlock(account.credits, cost)?;

    let key = ContentKey::new(companion.id, &item.id).to_string();
    let updated = match AccountRepo::debit_and_unlock(&state.pool, account.id, &key, cost).await? {
        Some(updated) => updated,
        None => {
            // Balance dropped between the read and the debit.
            let current = load_account(&state.pool, account.id).await?;
            return Err(CoreError::InsufficientCredits {
                required: cost,
                available: current.credits,
            }
            .into());
        }
    };

    tracing::info!(
        account_id = account.id,
        content_key = %key,
        cost,
        balance = updated.credits,
        "Content unlocked"
    );
    state.event_bus.publish(
        PlatformEvent::new(names::CONTENT_UNLOCKED)
            .with_source("companion", companion.id)
            .with_actor(account.id)
            .with_payload(serde_json::json!({
                "content_key": key,
                "cost": cost,
                "balance": updated.credits,
            })),
    );

    Ok(Json(DataResponse {
        data: updated.snapshot()?,
    }))
}
