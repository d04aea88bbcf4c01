//! Account review: approval and manual credit grants.

use axum::extract::{Path, Query, State};
use axum::Json;
use companion_core::error::CoreError;
use companion_core::types::{Credits, DbId};
use companion_db::models::account::AccountResponse;
use companion_db::repositories::AccountRepo;
use companion_events::{names, PlatformEvent};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::AccountListParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
}

#[derive(Debug, Deserialize)]
pub struct GrantCreditsRequest {
    pub amount: Credits,
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Account",
        id,
    }
}

/// GET /api/v1/admin/accounts
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<AccountListParams>,
) -> AppResult<Json<DataResponse<Vec<AccountResponse>>>> {
    let page = params.page();
    let accounts =
        AccountRepo::list(&state.pool, params.pending_only, page.limit(), page.offset()).await?;
    let data = accounts
        .iter()
        .map(|a| a.to_response())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/admin/accounts/{id}/approval
pub async fn set_approval(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ApprovalRequest>,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let account = AccountRepo::set_approved(&state.pool, id, input.approved)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(account_id = id, approved = input.approved, "Account approval changed");
    state.event_bus.publish(
        PlatformEvent::new(names::ACCOUNT_APPROVAL_CHANGED)
            .with_source("account", id)
            .with_actor(admin.account_id)
            .with_payload(serde_json::json!({ "approved": input.approved })),
    );
    Ok(Json(DataResponse {
        data: account.to_response()?,
    }))
}

/// POST /api/v1/admin/accounts/{id}/credits
pub async fn grant_credits(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<GrantCreditsRequest>,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    if input.amount <= 0 {
        return Err(CoreError::Validation("Credit grant must be positive".into()).into());
    }
    let account = AccountRepo::grant_credits(&state.pool, id, input.amount)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(account_id = id, amount = input.amount, "Credits granted");
    state.event_bus.publish(
        PlatformEvent::new(names::ACCOUNT_CREDITS_GRANTED)
            .with_source("account", id)
            .with_actor(admin.account_id)
            .with_payload(serde_json::json!({
                "amount": input.amount,
                "balance": account.credits,
            })),
    );
    Ok(Json(DataResponse {
        data: account.to_response()?,
    }))
}
