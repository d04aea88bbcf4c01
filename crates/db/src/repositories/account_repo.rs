//! Repository for the `accounts` table.

use companion_core::types::{Credits, DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::account::{Account, AccountGrant, CreateAccount};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, display_name, role, credits, tier, is_premium, \
                        subscription_expires_at, unlocked_content, approved, age_verified_at, \
                        is_active, last_login_at, failed_login_count, locked_until, \
                        created_at, updated_at";

/// Provides CRUD and ledger operations for accounts.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAccount) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (email, password_hash, display_name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.display_name)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find an account by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by email. Emails are stored lowercased.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE email = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List accounts, newest first, optionally only those awaiting approval.
    pub async fn list(
        pool: &PgPool,
        pending_approval_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Account>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM accounts
             WHERE ($1 = false OR approved = false)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(pending_approval_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Set the self-chosen display name.
    pub async fn update_display_name(
        pool: &PgPool,
        id: DbId,
        display_name: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET display_name = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(display_name)
            .fetch_optional(pool)
            .await
    }

    /// Record age verification. The first timestamp is kept on repeat calls.
    pub async fn verify_age(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET age_verified_at = COALESCE(age_verified_at, NOW())
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Debit `cost` and add `content_key` to the unlocked set in one statement.
    ///
    /// The update only applies while `credits >= cost`, so two concurrent
    /// unlocks cannot overdraw the balance. Returns `None` when the account
    /// does not exist or the balance no longer covers the cost. A key that is
    /// already present is not duplicated, but the cost is still debited.
    pub async fn debit_and_unlock(
        pool: &PgPool,
        id: DbId,
        content_key: &str,
        cost: Credits,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET
                credits = credits - $2,
                unlocked_content = CASE
                    WHEN $3 = ANY(unlocked_content) THEN unlocked_content
                    ELSE array_append(unlocked_content, $3)
                END
             WHERE id = $1 AND credits >= $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(cost)
            .bind(content_key)
            .fetch_optional(pool)
            .await
    }

    /// Debit `cost` without unlocking anything (voice replies).
    ///
    /// Same conditional guard as [`debit_and_unlock`](Self::debit_and_unlock).
    pub async fn debit_credits(
        pool: &PgPool,
        id: DbId,
        cost: Credits,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET credits = credits - $2
             WHERE id = $1 AND credits >= $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(cost)
            .fetch_optional(pool)
            .await
    }

    /// Add credits directly (admin grant).
    pub async fn grant_credits(
        pool: &PgPool,
        id: DbId,
        amount: Credits,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET credits = credits + $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(amount)
            .fetch_optional(pool)
            .await
    }

    /// Flip the platform-access approval flag.
    pub async fn set_approved(
        pool: &PgPool,
        id: DbId,
        approved: bool,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("UPDATE accounts SET approved = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(approved)
            .fetch_optional(pool)
            .await
    }

    /// Apply an approved payment's grant and approve the account.
    ///
    /// Runs on the caller's transaction connection.
    pub async fn apply_grant(
        conn: &mut PgConnection,
        id: DbId,
        grant: &AccountGrant,
    ) -> Result<Account, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET
                credits = credits + $2,
                tier = COALESCE($3, tier),
                is_premium = CASE WHEN $3 IS NULL THEN is_premium ELSE true END,
                subscription_expires_at = COALESCE($4, subscription_expires_at),
                approved = true
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(grant.credits)
            .bind(&grant.tier)
            .bind(grant.subscription_expires_at)
            .fetch_one(conn)
            .await
    }

    /// Drop lapsed subscriptions back to the free tier.
    ///
    /// Returns the number of accounts downgraded.
    pub async fn expire_subscriptions(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE accounts SET
                tier = 'free',
                is_premium = false,
                subscription_expires_at = NULL
             WHERE subscription_expires_at IS NOT NULL AND subscription_expires_at <= $1",
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Increment the failed login counter by 1.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE accounts SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Lock an account until the specified timestamp.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE accounts SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count` to 0, clear `locked_until`,
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE accounts SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
