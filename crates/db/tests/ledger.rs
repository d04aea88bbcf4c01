//! Integration tests for the account ledger queries.
//!
//! Covers the conditional debit, payment grants and subscription expiry
//! against a real database.

use chrono::{Duration, Utc};
use companion_db::models::account::{Account, AccountGrant, CreateAccount};
use companion_db::repositories::AccountRepo;
use sqlx::PgPool;

async fn account_with_credits(pool: &PgPool, email: &str, credits: i64) -> Account {
    let account = AccountRepo::create(
        pool,
        &CreateAccount {
            email: email.to_string(),
            password_hash: "x".to_string(),
            display_name: None,
            role: "user".to_string(),
        },
    )
    .await
    .unwrap();
    AccountRepo::grant_credits(pool, account.id, credits)
        .await
        .unwrap()
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn new_accounts_start_empty_and_unapproved(pool: PgPool) {
    let account = account_with_credits(&pool, "new@test.com", 0).await;
    assert_eq!(account.credits, 0);
    assert_eq!(account.tier, "free");
    assert!(!account.approved);
    assert!(account.unlocked_content.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn debit_and_unlock_records_key(pool: PgPool) {
    let account = account_with_credits(&pool, "unlock@test.com", 100).await;

    let updated = AccountRepo::debit_and_unlock(&pool, account.id, "1:saree", 50)
        .await
        .unwrap()
        .expect("balance covers cost");
    assert_eq!(updated.credits, 50);
    assert_eq!(updated.unlocked_content, vec!["1:saree".to_string()]);
}

#[sqlx::test(migrations = "./migrations")]
async fn debit_and_unlock_refuses_short_balance(pool: PgPool) {
    let account = account_with_credits(&pool, "short@test.com", 40).await;

    let result = AccountRepo::debit_and_unlock(&pool, account.id, "1:saree", 50)
        .await
        .unwrap();
    assert!(result.is_none());

    let unchanged = AccountRepo::find_by_id(&pool, account.id).await.unwrap().unwrap();
    assert_eq!(unchanged.credits, 40);
    assert!(unchanged.unlocked_content.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn repeat_unlock_charges_again_without_duplicating(pool: PgPool) {
    let account = account_with_credits(&pool, "twice@test.com", 100).await;

    AccountRepo::debit_and_unlock(&pool, account.id, "1:saree", 30)
        .await
        .unwrap()
        .unwrap();
    let second = AccountRepo::debit_and_unlock(&pool, account.id, "1:saree", 30)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.credits, 40);
    assert_eq!(second.unlocked_content.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_unlocks_never_overdraw(pool: PgPool) {
    let account = account_with_credits(&pool, "race@test.com", 50).await;

    let (a, b) = tokio::join!(
        AccountRepo::debit_and_unlock(&pool, account.id, "1:a", 45),
        AccountRepo::debit_and_unlock(&pool, account.id, "1:b", 45),
    );
    let succeeded = [a.unwrap(), b.unwrap()].iter().filter(|r| r.is_some()).count();
    assert_eq!(succeeded, 1);

    let after = AccountRepo::find_by_id(&pool, account.id).await.unwrap().unwrap();
    assert_eq!(after.credits, 5);
    assert_eq!(after.unlocked_content.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn package_grant_sets_tier_and_approval(pool: PgPool) {
    let account = account_with_credits(&pool, "grant@test.com", 10).await;
    let expires = Utc::now() + Duration::days(30);

    let mut conn = pool.acquire().await.unwrap();
    let updated = AccountRepo::apply_grant(
        &mut conn,
        account.id,
        &AccountGrant {
            credits: 300,
            tier: Some("premium".to_string()),
            subscription_expires_at: Some(expires),
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.credits, 310);
    assert_eq!(updated.tier, "premium");
    assert!(updated.is_premium);
    assert!(updated.approved);
    assert!(updated.subscription_expires_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn expired_subscriptions_drop_to_free(pool: PgPool) {
    let account = account_with_credits(&pool, "lapsed@test.com", 0).await;
    let mut conn = pool.acquire().await.unwrap();
    AccountRepo::apply_grant(
        &mut conn,
        account.id,
        &AccountGrant {
            credits: 0,
            tier: Some("basic".to_string()),
            subscription_expires_at: Some(Utc::now() - Duration::hours(1)),
        },
    )
    .await
    .unwrap();
    drop(conn);

    let downgraded = AccountRepo::expire_subscriptions(&pool, Utc::now()).await.unwrap();
    assert_eq!(downgraded, 1);

    let after = AccountRepo::find_by_id(&pool, account.id).await.unwrap().unwrap();
    assert_eq!(after.tier, "free");
    assert!(!after.is_premium);
    assert!(after.subscription_expires_at.is_none());
    assert!(after.approved, "expiry does not revoke approval");
}

#[sqlx::test(migrations = "./migrations")]
async fn negative_balance_is_rejected_by_schema(pool: PgPool) {
    let account = account_with_credits(&pool, "neg@test.com", 5).await;
    let result = sqlx::query("UPDATE accounts SET credits = -1 WHERE id = $1")
        .bind(account.id)
        .execute(&pool)
        .await;
    assert!(result.is_err());
}
