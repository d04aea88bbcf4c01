//! Handlers for manual payment requests.
//!
//! Accounts submit a mobile-wallet transfer for review; admins approve or
//! reject it. Approval is applied by [`PaymentRepo::decide`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use companion_core::error::CoreError;
use companion_core::payment::{
    validate_submission, PaymentKind, PaymentMethod, PaymentStatus, Submission, CREDIT_PACKS,
};
use companion_core::referral::normalize_code;
use companion_core::tier::Tier;
use companion_core::types::{Credits, DbId};
use companion_db::models::payment::{CreatePaymentRequest, PaymentRequest};
use companion_db::repositories::{PaymentRepo, ReferralRepo};
use companion_events::{names, PlatformEvent};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaymentListParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitPaymentRequest {
    pub kind: PaymentKind,
    /// Taka actually sent, after any referral discount.
    pub amount: i64,
    pub package_tier: Option<Tier>,
    pub method: PaymentMethod,
    pub sender_number: String,
    pub transaction_id: String,
    pub referral_code: Option<String>,
}

/// One credit pack on the purchase overlay.
#[derive(Debug, Serialize)]
pub struct CreditPackOffer {
    pub price: i64,
    pub credits: Credits,
}

/// One subscription tier on the purchase overlay.
#[derive(Debug, Serialize)]
pub struct TierOffer {
    pub tier: Tier,
    pub monthly_price: i64,
    /// `None` means unlimited.
    pub daily_message_limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PriceCatalog {
    pub credit_packs: Vec<CreditPackOffer>,
    pub tiers: Vec<TierOffer>,
}

/// GET /api/v1/payments/catalog
pub async fn catalog(_auth_user: AuthUser) -> Json<DataResponse<PriceCatalog>> {
    let credit_packs = CREDIT_PACKS
        .iter()
        .map(|&(price, credits)| CreditPackOffer { price, credits })
        .collect();
    let tiers = Tier::ALL
        .into_iter()
        .filter(|tier| tier.is_paid())
        .map(|tier| TierOffer {
            tier,
            monthly_price: tier.monthly_price(),
            daily_message_limit: tier.daily_message_limit(),
        })
        .collect();
    Json(DataResponse {
        data: PriceCatalog {
            credit_packs,
            tiers,
        },
    })
}

/// POST /api/v1/payments
///
/// An unknown or inactive referral code is rejected so the user can fix it
/// before paying the undiscounted price.
pub async fn submit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<SubmitPaymentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PaymentRequest>>)> {
    validate_submission(&Submission {
        kind: input.kind,
        amount: input.amount,
        package_tier: input.package_tier,
        transaction_id: &input.transaction_id,
        sender_number: &input.sender_number,
    })?;

    let code = input
        .referral_code
        .as_deref()
        .map(normalize_code)
        .filter(|c| !c.is_empty());
    let mut discount_amount = 0;
    if let Some(code) = &code {
        let referral = ReferralRepo::find_active_by_code(&state.pool, code)
            .await?
            .ok_or_else(|| CoreError::Validation(format!("Referral code '{code}' is not valid")))?;
        discount_amount = referral.discount_amount;
    }

    let payment = PaymentRepo::create(
        &state.pool,
        &CreatePaymentRequest {
            account_id: auth_user.account_id,
            kind: input.kind.as_str().to_string(),
            amount: input.amount,
            package_tier: input.package_tier.map(|t| t.as_str().to_string()),
            method: input.method.as_str().to_string(),
            sender_number: input.sender_number.trim().to_string(),
            transaction_id: input.transaction_id.trim().to_string(),
            referral_code: code,
            discount_amount,
        },
    )
    .await?;

    tracing::info!(
        payment_id = payment.id,
        account_id = auth_user.account_id,
        kind = %payment.kind,
        amount = payment.amount,
        "Payment request submitted"
    );
    state.event_bus.publish(
        PlatformEvent::new(names::PAYMENT_SUBMITTED)
            .with_source("payment_request", payment.id)
            .with_actor(auth_user.account_id)
            .with_payload(serde_json::json!({
                "kind": payment.kind,
                "amount": payment.amount,
                "method": payment.method,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: payment })))
}

/// GET /api/v1/payments
pub async fn list_mine(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<PaymentRequest>>>> {
    let payments = PaymentRepo::list_for_account(&state.pool, auth_user.account_id).await?;
    Ok(Json(DataResponse { data: payments }))
}

/// GET /api/v1/admin/payments
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaymentListParams>,
) -> AppResult<Json<DataResponse<Vec<PaymentRequest>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<PaymentStatus>)
        .transpose()?;
    let page = params.page();
    let payments = PaymentRepo::list(
        &state.pool,
        status.map(PaymentStatus::as_str),
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: payments }))
}

/// POST /api/v1/admin/payments/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PaymentRequest>>> {
    decide(&state, admin.account_id, id, PaymentStatus::Approved).await
}

/// POST /api/v1/admin/payments/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PaymentRequest>>> {
    decide(&state, admin.account_id, id, PaymentStatus::Rejected).await
}

async fn decide(
    state: &AppState,
    admin_id: DbId,
    id: DbId,
    to: PaymentStatus,
) -> AppResult<Json<DataResponse<PaymentRequest>>> {
    let decision = PaymentRepo::decide(&state.pool, id, to, admin_id, Utc::now()).await?;
    let payment = decision.payment;

    let event_type = match to {
        PaymentStatus::Approved => names::PAYMENT_APPROVED,
        _ => names::PAYMENT_REJECTED,
    };
    tracing::info!(
        payment_id = payment.id,
        account_id = payment.account_id,
        admin_id,
        status = %payment.status,
        credits_granted = ?payment.credits_granted,
        "Payment request decided"
    );
    state.event_bus.publish(
        PlatformEvent::new(event_type)
            .with_source("payment_request", payment.id)
            .with_actor(admin_id)
            .with_payload(serde_json::json!({
                "account_id": payment.account_id,
                "credits_granted": payment.credits_granted,
                "tier": decision.account.as_ref().map(|a| a.tier.clone()),
                "commission": decision.commission.as_ref().map(|c| c.commission_amount),
            })),
    );

    Ok(Json(DataResponse { data: payment }))
}
