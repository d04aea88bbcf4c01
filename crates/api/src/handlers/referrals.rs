//! Handlers for influencer referral codes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use companion_core::error::CoreError;
use companion_core::referral::{generate_code, normalize_code, validate_code, validate_terms};
use companion_core::types::DbId;
use companion_db::models::referral::{CreateReferral, Referral, ReferralTransaction};
use companion_db::repositories::ReferralRepo;
use companion_events::{names, PlatformEvent};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::TransactionListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// What checkout learns about a code.
#[derive(Debug, Serialize)]
pub struct ReferralLookup {
    pub code: String,
    pub discount_amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateReferralRequest {
    /// Generated when omitted.
    pub code: Option<String>,
    pub influencer_name: String,
    pub commission_rate_pct: i32,
    #[serde(default)]
    pub discount_amount: i64,
}

/// GET /api/v1/referrals/{code}
pub async fn lookup(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(code): Path<String>,
) -> AppResult<Json<DataResponse<ReferralLookup>>> {
    let code = normalize_code(&code);
    let referral = ReferralRepo::find_active_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Referral code '{code}' not found")))?;
    Ok(Json(DataResponse {
        data: ReferralLookup {
            code: referral.code,
            discount_amount: referral.discount_amount,
        },
    }))
}

/// GET /api/v1/admin/referrals
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Referral>>>> {
    let referrals = ReferralRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: referrals }))
}

/// POST /api/v1/admin/referrals
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateReferralRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Referral>>)> {
    let code = match input.code.as_deref().map(normalize_code) {
        Some(code) if !code.is_empty() => code,
        _ => generate_code(),
    };
    validate_code(&code)?;
    validate_terms(input.commission_rate_pct, input.discount_amount)?;
    let influencer_name = input.influencer_name.trim();
    if influencer_name.is_empty() {
        return Err(CoreError::Validation("Influencer name must not be empty".into()).into());
    }

    let referral = ReferralRepo::create(
        &state.pool,
        &CreateReferral {
            code,
            influencer_name: influencer_name.to_string(),
            commission_rate_pct: input.commission_rate_pct,
            discount_amount: input.discount_amount,
        },
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(names::REFERRAL_CREATED)
            .with_source("referral", referral.id)
            .with_actor(admin.account_id)
            .with_payload(serde_json::json!({ "code": referral.code })),
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: referral })))
}

/// DELETE /api/v1/admin/referrals/{id}
///
/// Soft delete: the code stops resolving but its ledger is kept.
/// Pending requests that carry the code keep their discount but earn no
/// commission once approved.
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ReferralRepo::deactivate(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Referral",
            id,
        }
        .into());
    }
    state.event_bus.publish(
        PlatformEvent::new(names::REFERRAL_DEACTIVATED)
            .with_source("referral", id)
            .with_actor(admin.account_id),
    );
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/referrals/transactions
pub async fn transactions(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<TransactionListParams>,
) -> AppResult<Json<DataResponse<Vec<ReferralTransaction>>>> {
    let entries = ReferralRepo::list_transactions(&state.pool, params.referral_id).await?;
    Ok(Json(DataResponse { data: entries }))
}
