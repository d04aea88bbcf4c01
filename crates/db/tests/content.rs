//! Integration tests for companions, chat histories and referrals.

use companion_core::chat::ChatMessage;
use companion_core::profile::default_profiles;
use companion_db::models::account::CreateAccount;
use companion_db::models::referral::CreateReferral;
use companion_db::repositories::{AccountRepo, ChatHistoryRepo, CompanionRepo, ReferralRepo};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn seed_runs_only_on_empty_store(pool: PgPool) {
    let defaults = default_profiles().unwrap();

    let inserted = CompanionRepo::seed_if_empty(&pool, &defaults).await.unwrap();
    assert_eq!(inserted, defaults.len());

    let again = CompanionRepo::seed_if_empty(&pool, &defaults).await.unwrap();
    assert_eq!(again, 0);

    let listed = CompanionRepo::list(&pool, false).await.unwrap();
    assert_eq!(listed.len(), defaults.len());
    assert_eq!(listed[0].content(), defaults[0]);
}

#[sqlx::test(migrations = "./migrations")]
async fn unpublished_profiles_are_hidden_from_public_list(pool: PgPool) {
    let mut profile = default_profiles().unwrap().remove(0);
    profile.is_published = false;
    let created = CompanionRepo::create(&pool, &profile).await.unwrap();

    assert!(CompanionRepo::list(&pool, false).await.unwrap().is_empty());
    let all = CompanionRepo::list(&pool, true).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, created.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn chat_history_is_overwritten_per_turn(pool: PgPool) {
    let account = AccountRepo::create(
        &pool,
        &CreateAccount {
            email: "chat@test.com".into(),
            password_hash: "x".into(),
            display_name: None,
            role: "user".into(),
        },
    )
    .await
    .unwrap();
    let companion = CompanionRepo::create(&pool, &default_profiles().unwrap()[0])
        .await
        .unwrap();

    assert!(ChatHistoryRepo::get(&pool, account.id, companion.id)
        .await
        .unwrap()
        .is_empty());

    let first = vec![ChatMessage::from_user("hi", None)];
    ChatHistoryRepo::put(&pool, account.id, companion.id, &first).await.unwrap();

    let second = vec![
        first[0].clone(),
        ChatMessage::from_companion("hello!"),
    ];
    ChatHistoryRepo::put(&pool, account.id, companion.id, &second).await.unwrap();

    let stored = ChatHistoryRepo::get(&pool, account.id, companion.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].text, "hello!");

    assert!(ChatHistoryRepo::delete(&pool, account.id, companion.id).await.unwrap());
    assert!(!ChatHistoryRepo::delete(&pool, account.id, companion.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn referral_codes_are_unique_and_deactivatable(pool: PgPool) {
    let input = CreateReferral {
        code: "RIYA10".into(),
        influencer_name: "Riya".into(),
        commission_rate_pct: 10,
        discount_amount: 20,
    };
    let created = ReferralRepo::create(&pool, &input).await.unwrap();

    let duplicate = ReferralRepo::create(&pool, &input).await;
    match duplicate {
        Err(sqlx::Error::Database(db_err)) => {
            assert_eq!(db_err.constraint(), Some("uq_referrals_code"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }

    assert!(ReferralRepo::find_active_by_code(&pool, "RIYA10").await.unwrap().is_some());
    assert!(ReferralRepo::deactivate(&pool, created.id).await.unwrap());
    assert!(ReferralRepo::find_active_by_code(&pool, "RIYA10").await.unwrap().is_none());
}
