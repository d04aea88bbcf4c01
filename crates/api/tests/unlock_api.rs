//! Gallery redaction and credit-spending unlocks over HTTP.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth};
use companion_core::profile::default_profiles;
use companion_core::types::DbId;
use companion_db::repositories::{AccountRepo, CompanionRepo};
use sqlx::PgPool;

/// Seed the bundled profiles and return the id of `ayesha`.
async fn seed(pool: &PgPool) -> DbId {
    CompanionRepo::seed_if_empty(pool, &default_profiles().unwrap())
        .await
        .unwrap();
    CompanionRepo::list(pool, true)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.slug == "ayesha")
        .expect("ayesha is bundled")
        .id
}

fn unlock_body(companion_id: DbId, item_id: &str) -> serde_json::Value {
    serde_json::json!({ "companion_id": companion_id, "item_id": item_id })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn locked_items_hide_their_url(pool: PgPool) {
    let companion_id = seed(&pool).await;
    let app = common::build_test_app(pool);
    let account = common::register(app.clone(), "viewer@example.com").await;

    let json = body_json(
        get_auth(app, &format!("/api/v1/companions/{companion_id}"), &account.token).await,
    )
    .await;

    let gallery = json["data"]["gallery"].as_array().unwrap();
    let rooftop = gallery.iter().find(|i| i["id"] == "rooftop").unwrap();
    assert_eq!(rooftop["locked"], false);
    assert!(rooftop["url"].is_string());

    let saree = gallery.iter().find(|i| i["id"] == "saree").unwrap();
    assert_eq!(saree["locked"], true);
    assert!(saree["url"].is_null());
    assert_eq!(saree["credit_cost"], 50);

    assert!(json["data"].get("persona_prompt").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unlock_debits_and_reveals_the_item(pool: PgPool) {
    let companion_id = seed(&pool).await;
    let app = common::build_test_app(pool.clone());
    let account = common::approved_account(app.clone(), &pool, "buyer@example.com", 60).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/account/unlocks",
        unlock_body(companion_id, "saree"),
        &account.token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["credits"], 10);
    assert_eq!(
        json["data"]["unlocked_content"],
        serde_json::json!([format!("{companion_id}:saree")])
    );

    let json = body_json(
        get_auth(app, &format!("/api/v1/companions/{companion_id}"), &account.token).await,
    )
    .await;
    let saree = json["data"]["gallery"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"] == "saree")
        .cloned()
        .unwrap();
    assert_eq!(saree["locked"], false);
    assert!(saree["url"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn short_balance_is_402_and_changes_nothing(pool: PgPool) {
    let companion_id = seed(&pool).await;
    let app = common::build_test_app(pool.clone());
    let account = common::approved_account(app.clone(), &pool, "short@example.com", 40).await;

    let response = post_json_auth(
        app,
        "/api/v1/account/unlocks",
        unlock_body(companion_id, "saree"),
        &account.token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body_json(response).await["code"], "INSUFFICIENT_CREDITS");

    let stored = AccountRepo::find_by_id(&pool, account.id).await.unwrap().unwrap();
    assert_eq!(stored.credits, 40);
    assert!(stored.unlocked_content.is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unlocking_twice_charges_twice(pool: PgPool) {
    let companion_id = seed(&pool).await;
    let app = common::build_test_app(pool.clone());
    let account = common::approved_account(app.clone(), &pool, "twice@example.com", 100).await;

    for _ in 0..2 {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/account/unlocks",
            unlock_body(companion_id, "saree"),
            &account.token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored = AccountRepo::find_by_id(&pool, account.id).await.unwrap().unwrap();
    assert_eq!(stored.credits, 0);
    assert_eq!(stored.unlocked_content.len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn free_and_unknown_items_cannot_be_unlocked(pool: PgPool) {
    let companion_id = seed(&pool).await;
    let app = common::build_test_app(pool.clone());
    let account = common::approved_account(app.clone(), &pool, "odd@example.com", 500).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/account/unlocks",
        unlock_body(companion_id, "rooftop"),
        &account.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app,
        "/api/v1/account/unlocks",
        unlock_body(companion_id, "no-such-item"),
        &account.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unapproved_accounts_cannot_unlock(pool: PgPool) {
    let companion_id = seed(&pool).await;
    let app = common::build_test_app(pool.clone());
    let account = common::register(app.clone(), "waiting@example.com").await;
    AccountRepo::grant_credits(&pool, account.id, 500).await.unwrap();

    let response = post_json_auth(
        app,
        "/api/v1/account/unlocks",
        unlock_body(companion_id, "saree"),
        &account.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
