//! Repository for the `payment_requests` table.

use companion_core::error::CoreError;
use companion_core::payment::{
    compute_grant, gross_amount, transition, PaymentKind, PaymentStatus,
};
use companion_core::referral::commission_for;
use companion_core::tier::Tier;
use companion_core::types::{Credits, DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::account::{Account, AccountGrant};
use crate::models::payment::{CreatePaymentRequest, PaymentRequest};
use crate::models::referral::ReferralTransaction;
use crate::repositories::{AccountRepo, ReferralRepo};

const COLUMNS: &str = "id, account_id, kind, amount, package_tier, method, sender_number, \
                        transaction_id, referral_code, discount_amount, status, credits_granted, \
                        decided_by, decided_at, created_at, updated_at";

/// Failure of a review decision: either a rule or the database.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error(transparent)]
    Rule(#[from] CoreError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Everything a review decision changed.
#[derive(Debug)]
pub struct PaymentDecision {
    pub payment: PaymentRequest,
    /// The credited account; `None` on rejection.
    pub account: Option<Account>,
    /// Commission recorded for the referral code used, if it is still active.
    pub commission: Option<ReferralTransaction>,
}

/// Manual payment requests and their review decisions.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Insert a new pending request.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePaymentRequest,
    ) -> Result<PaymentRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO payment_requests
                (account_id, kind, amount, package_tier, method, sender_number,
                 transaction_id, referral_code, discount_amount)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaymentRequest>(&query)
            .bind(input.account_id)
            .bind(&input.kind)
            .bind(input.amount)
            .bind(&input.package_tier)
            .bind(&input.method)
            .bind(&input.sender_number)
            .bind(&input.transaction_id)
            .bind(&input.referral_code)
            .bind(input.discount_amount)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PaymentRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payment_requests WHERE id = $1");
        sqlx::query_as::<_, PaymentRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a request row for the rest of the caller's transaction.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<PaymentRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payment_requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, PaymentRequest>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Record the reviewer's decision on a locked row.
    pub async fn record_decision(
        conn: &mut PgConnection,
        id: DbId,
        status: &str,
        decided_by: DbId,
        credits_granted: Option<Credits>,
    ) -> Result<PaymentRequest, sqlx::Error> {
        let query = format!(
            "UPDATE payment_requests SET
                status = $2,
                decided_by = $3,
                decided_at = NOW(),
                credits_granted = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaymentRequest>(&query)
            .bind(id)
            .bind(status)
            .bind(decided_by)
            .bind(credits_granted)
            .fetch_one(conn)
            .await
    }

    /// The caller's own requests, newest first.
    pub async fn list_for_account(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<PaymentRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payment_requests
             WHERE account_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, PaymentRequest>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// Review queue. Pending requests are listed oldest first so they are
    /// handled in arrival order; everything else newest first.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PaymentRequest>, sqlx::Error> {
        let order = if status == Some("pending") { "ASC" } else { "DESC" };
        let query = format!(
            "SELECT {COLUMNS} FROM payment_requests
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at {order}, id {order}
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PaymentRequest>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Approve or reject a pending request in one transaction.
    ///
    /// The row is locked first so two reviewers cannot both decide it.
    /// Approval credits the account, applies any package tier, approves the
    /// account and records referral commission on the net amount.
    pub async fn decide(
        pool: &PgPool,
        id: DbId,
        to: PaymentStatus,
        decided_by: DbId,
        now: Timestamp,
    ) -> Result<PaymentDecision, DecisionError> {
        let mut tx = pool.begin().await?;

        let current = Self::find_for_update(&mut tx, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "PaymentRequest",
                id,
            })?;
        transition(current.status.parse()?, to)?;

        if to == PaymentStatus::Rejected {
            let payment =
                Self::record_decision(&mut tx, id, to.as_str(), decided_by, None).await?;
            tx.commit().await?;
            return Ok(PaymentDecision {
                payment,
                account: None,
                commission: None,
            });
        }

        let kind: PaymentKind = current.kind.parse()?;
        let package_tier = current
            .package_tier
            .as_deref()
            .map(str::parse::<Tier>)
            .transpose()?;
        let grant = compute_grant(
            kind,
            gross_amount(current.amount, current.discount_amount)?,
            package_tier,
            now,
        )?;

        let account = AccountRepo::apply_grant(
            &mut tx,
            current.account_id,
            &AccountGrant {
                credits: grant.credits,
                tier: grant.tier.map(|t| t.as_str().to_string()),
                subscription_expires_at: grant.subscription_expires_at,
            },
        )
        .await?;
        let payment =
            Self::record_decision(&mut tx, id, to.as_str(), decided_by, Some(grant.credits))
                .await?;

        let mut commission = None;
        if let Some(code) = current.referral_code.as_deref() {
            if let Some(referral) = ReferralRepo::find_active_by_code(&mut *tx, code).await? {
                let earned = commission_for(current.amount, referral.commission_rate_pct)?;
                commission = Some(
                    ReferralRepo::record_transaction(
                        &mut *tx,
                        referral.id,
                        id,
                        current.account_id,
                        current.amount,
                        earned,
                    )
                    .await?,
                );
            }
        }

        tx.commit().await?;
        Ok(PaymentDecision {
            payment,
            account: Some(account),
            commission,
        })
    }
}
