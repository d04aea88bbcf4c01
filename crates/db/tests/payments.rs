//! Integration tests for the payment review transaction.

use chrono::Utc;
use companion_core::error::CoreError;
use companion_core::payment::PaymentStatus;
use companion_db::models::account::{Account, CreateAccount};
use companion_db::models::payment::CreatePaymentRequest;
use companion_db::models::referral::CreateReferral;
use companion_db::repositories::payment_repo::DecisionError;
use companion_db::repositories::{AccountRepo, PaymentRepo, ReferralRepo};
use sqlx::PgPool;

async fn create_account(pool: &PgPool, email: &str, role: &str) -> Account {
    AccountRepo::create(
        pool,
        &CreateAccount {
            email: email.into(),
            password_hash: "x".into(),
            display_name: None,
            role: role.into(),
        },
    )
    .await
    .unwrap()
}

fn credits_request(account_id: i64, amount: i64) -> CreatePaymentRequest {
    CreatePaymentRequest {
        account_id,
        kind: "credits".into(),
        amount,
        package_tier: None,
        method: "bkash".into(),
        sender_number: "01712345678".into(),
        transaction_id: "TXN1".into(),
        referral_code: None,
        discount_amount: 0,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn approving_280_grants_300_and_approves(pool: PgPool) {
    let user = create_account(&pool, "buyer@test.com", "user").await;
    let admin = create_account(&pool, "admin@test.com", "admin").await;
    let request = PaymentRepo::create(&pool, &credits_request(user.id, 280)).await.unwrap();
    assert_eq!(request.status, "pending");

    let decision = PaymentRepo::decide(&pool, request.id, PaymentStatus::Approved, admin.id, Utc::now())
        .await
        .unwrap();

    assert_eq!(decision.payment.status, "approved");
    assert_eq!(decision.payment.credits_granted, Some(300));
    assert_eq!(decision.payment.decided_by, Some(admin.id));
    let account = decision.account.unwrap();
    assert_eq!(account.credits, 300);
    assert!(account.approved);
    assert!(decision.commission.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn package_approval_sets_tier(pool: PgPool) {
    let user = create_account(&pool, "pkg@test.com", "user").await;
    let admin = create_account(&pool, "admin@test.com", "admin").await;
    let mut input = credits_request(user.id, 599);
    input.kind = "package".into();
    input.package_tier = Some("premium".into());
    let request = PaymentRepo::create(&pool, &input).await.unwrap();

    let decision = PaymentRepo::decide(&pool, request.id, PaymentStatus::Approved, admin.id, Utc::now())
        .await
        .unwrap();
    let account = decision.account.unwrap();
    assert_eq!(account.tier, "premium");
    assert!(account.is_premium);
    assert!(account.subscription_expires_at.is_some());
    assert_eq!(account.credits, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn decided_requests_cannot_change_again(pool: PgPool) {
    let user = create_account(&pool, "twice@test.com", "user").await;
    let admin = create_account(&pool, "admin@test.com", "admin").await;
    let request = PaymentRepo::create(&pool, &credits_request(user.id, 100)).await.unwrap();

    PaymentRepo::decide(&pool, request.id, PaymentStatus::Rejected, admin.id, Utc::now())
        .await
        .unwrap();
    let again =
        PaymentRepo::decide(&pool, request.id, PaymentStatus::Approved, admin.id, Utc::now()).await;
    assert!(matches!(again, Err(DecisionError::Rule(CoreError::Conflict(_)))));

    let account = AccountRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(account.credits, 0);
    assert!(!account.approved, "rejection does not approve");
}

#[sqlx::test(migrations = "./migrations")]
async fn referral_commission_is_recorded_on_net_amount(pool: PgPool) {
    let user = create_account(&pool, "ref@test.com", "user").await;
    let admin = create_account(&pool, "admin@test.com", "admin").await;
    let referral = ReferralRepo::create(
        &pool,
        &CreateReferral {
            code: "RIYA10".into(),
            influencer_name: "Riya".into(),
            commission_rate_pct: 15,
            discount_amount: 30,
        },
    )
    .await
    .unwrap();

    let mut input = credits_request(user.id, 250);
    input.referral_code = Some("RIYA10".into());
    input.discount_amount = 30;
    let request = PaymentRepo::create(&pool, &input).await.unwrap();

    let decision = PaymentRepo::decide(&pool, request.id, PaymentStatus::Approved, admin.id, Utc::now())
        .await
        .unwrap();

    // 250 paid + 30 discount buys the 280 pack.
    assert_eq!(decision.account.unwrap().credits, 300);
    let commission = decision.commission.unwrap();
    assert_eq!(commission.referral_id, referral.id);
    assert_eq!(commission.amount, 250);
    assert_eq!(commission.commission_amount, 37);
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_request_is_not_found(pool: PgPool) {
    let admin = create_account(&pool, "admin@test.com", "admin").await;
    let result = PaymentRepo::decide(&pool, 9999, PaymentStatus::Approved, admin.id, Utc::now()).await;
    assert!(matches!(
        result,
        Err(DecisionError::Rule(CoreError::NotFound { .. }))
    ));
}
