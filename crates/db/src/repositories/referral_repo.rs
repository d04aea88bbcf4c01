//! Repository for the `referrals` and `referral_transactions` tables.

use companion_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::referral::{CreateReferral, Referral, ReferralTransaction};

const COLUMNS: &str = "id, code, influencer_name, commission_rate_pct, discount_amount, \
                        is_active, created_at, updated_at";

const TX_COLUMNS: &str = "id, referral_id, payment_request_id, account_id, amount, \
                           commission_amount, created_at";

/// Influencer codes and their commission ledger.
pub struct ReferralRepo;

impl ReferralRepo {
    /// Insert a code. Fails with `uq_referrals_code` on a duplicate.
    pub async fn create(pool: &PgPool, input: &CreateReferral) -> Result<Referral, sqlx::Error> {
        let query = format!(
            "INSERT INTO referrals (code, influencer_name, commission_rate_pct, discount_amount)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Referral>(&query)
            .bind(&input.code)
            .bind(&input.influencer_name)
            .bind(input.commission_rate_pct)
            .bind(input.discount_amount)
            .fetch_one(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Referral>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM referrals ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Referral>(&query).fetch_all(pool).await
    }

    /// Look up an active code. Works on a pool or inside a transaction.
    pub async fn find_active_by_code<'e, E>(
        executor: E,
        code: &str,
    ) -> Result<Option<Referral>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM referrals WHERE code = $1 AND is_active = true");
        sqlx::query_as::<_, Referral>(&query)
            .bind(code)
            .fetch_optional(executor)
            .await
    }

    /// Soft-delete: the code stops applying but its ledger stays.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE referrals SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the commission earned on an approved payment.
    pub async fn record_transaction<'e, E>(
        executor: E,
        referral_id: DbId,
        payment_request_id: DbId,
        account_id: DbId,
        amount: i64,
        commission_amount: i64,
    ) -> Result<ReferralTransaction, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO referral_transactions
                (referral_id, payment_request_id, account_id, amount, commission_amount)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TX_COLUMNS}"
        );
        sqlx::query_as::<_, ReferralTransaction>(&query)
            .bind(referral_id)
            .bind(payment_request_id)
            .bind(account_id)
            .bind(amount)
            .bind(commission_amount)
            .fetch_one(executor)
            .await
    }

    /// Ledger entries, optionally for one referral.
    pub async fn list_transactions(
        pool: &PgPool,
        referral_id: Option<DbId>,
    ) -> Result<Vec<ReferralTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {TX_COLUMNS} FROM referral_transactions
             WHERE ($1::BIGINT IS NULL OR referral_id = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ReferralTransaction>(&query)
            .bind(referral_id)
            .fetch_all(pool)
            .await
    }
}
