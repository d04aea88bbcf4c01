//! Referral codes: admin management, checkout lookup and commission.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_auth, post_json_auth};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn code_discount_and_commission_flow(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = common::register_admin(app.clone()).await;
    let user = common::register(app.clone(), "fan@example.com").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/referrals",
        serde_json::json!({
            "code": " rafi30 ",
            "influencer_name": "Rafi",
            "commission_rate_pct": 15,
            "discount_amount": 30,
        }),
        &admin.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let referral = body_json(response).await["data"].clone();
    assert_eq!(referral["code"], "RAFI30");
    let referral_id = referral["id"].as_i64().unwrap();

    let lookup = body_json(get_auth(app.clone(), "/api/v1/referrals/rafi30", &user.token).await).await;
    assert_eq!(lookup["data"]["discount_amount"], 30);

    // 280 pack paid at 250 with the 30 discount.
    let response = post_json_auth(
        app.clone(),
        "/api/v1/payments",
        serde_json::json!({
            "kind": "credits",
            "amount": 250,
            "method": "bkash",
            "sender_number": "01712345678",
            "transaction_id": "TXREF1",
            "referral_code": "Rafi30",
        }),
        &user.token,
    )
    .await;
    let payment = body_json(response).await["data"].clone();
    assert_eq!(payment["referral_code"], "RAFI30");
    assert_eq!(payment["discount_amount"], 30);
    let payment_id = payment["id"].as_i64().unwrap();

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/admin/payments/{payment_id}/approve"),
        &admin.token,
    )
    .await;
    assert_eq!(body_json(response).await["data"]["credits_granted"], 300);

    let ledger = body_json(
        get_auth(
            app,
            &format!("/api/v1/admin/referrals/transactions?referral_id={referral_id}"),
            &admin.token,
        )
        .await,
    )
    .await;
    let entries = ledger["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["amount"], 250);
    assert_eq!(entries[0]["commission_amount"], 37);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generated_codes_and_duplicates(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = common::register_admin(app.clone()).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/referrals",
        serde_json::json!({ "influencer_name": "Mim", "commission_rate_pct": 10 }),
        &admin.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let code = body_json(response).await["data"]["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 8);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/referrals",
        serde_json::json!({ "code": code, "influencer_name": "Copy", "commission_rate_pct": 10 }),
        &admin.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json_auth(
        app,
        "/api/v1/admin/referrals",
        serde_json::json!({ "code": "OVER100", "influencer_name": "Greedy", "commission_rate_pct": 101 }),
        &admin.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivated_codes_stop_resolving(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = common::register_admin(app.clone()).await;
    let user = common::register(app.clone(), "late@example.com").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/referrals",
        serde_json::json!({ "code": "GONE", "influencer_name": "Old", "commission_rate_pct": 5 }),
        &admin.token,
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = delete_auth(app.clone(), &format!("/api/v1/admin/referrals/{id}"), &admin.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, "/api/v1/referrals/GONE", &user.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
