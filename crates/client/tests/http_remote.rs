//! `HttpRemote` against a stub of the account endpoints.

use assert_matches::assert_matches;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use companion_client::{AccountRemote, ClientConfig, HttpRemote, RemoteError};
use companion_core::auth_messages::AuthFailure;
use companion_core::gallery::ContentKey;
use companion_core::tier::Tier;
use serde_json::{json, Value};

const TOKEN: &str = "valid-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid or expired token", "code": "UNAUTHORIZED" })),
    )
        .into_response()
}

async fn account(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "data": {
            "id": 4,
            "display_name": "Nila",
            "credits": 300,
            "tier": "premium",
            "is_premium": true,
            "subscription_expires_at": "2026-11-17T00:00:00Z",
            "approved": true,
            "unlocked_content": ["1:rain"],
            "email": "nila@example.com",
            "role": "admin",
            "age_verified_at": null,
            "is_active": true,
            "created_at": "2026-10-01T00:00:00Z"
        }
    }))
    .into_response()
}

async fn unlock(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["item_id"] == "pricey" {
        return (
            StatusCode::PAYMENT_REQUIRED,
            Json(json!({
                "error": "Insufficient credits: 500 required, 300 available",
                "code": "INSUFFICIENT_CREDITS"
            })),
        )
            .into_response();
    }
    assert_eq!(body["companion_id"], 1);
    Json(json!({ "data": {} })).into_response()
}

async fn start_stub() -> ClientConfig {
    let app = Router::new()
        .route("/api/v1/account", get(account))
        .route("/api/v1/account/unlocks", post(unlock));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ClientConfig::new(format!("http://{addr}/"), "unused.json")
}

#[tokio::test]
async fn fetch_account_reads_the_envelope_and_role() {
    let config = start_stub().await;
    let remote = HttpRemote::new(&config, TOKEN);

    let fetched = remote.fetch_account().await.unwrap();

    assert!(fetched.is_admin);
    assert_eq!(fetched.account.id, 4);
    assert_eq!(fetched.account.credits, 300);
    assert_eq!(fetched.account.tier, Tier::Premium);
    assert!(fetched.account.unlocked_content.contains("1:rain"));
}

#[tokio::test]
async fn rejected_token_is_a_session_failure() {
    let config = start_stub().await;
    let remote = HttpRemote::new(&config, "stale");

    let err = remote.fetch_account().await.unwrap_err();

    assert_matches!(err, RemoteError::Rejected { status: 401, .. });
    assert_eq!(err.auth_failure(), Some(AuthFailure::SessionExpired));
}

#[tokio::test]
async fn unlock_surfaces_server_error_codes() {
    let config = start_stub().await;
    let remote = HttpRemote::new(&config, TOKEN);

    remote
        .debit_and_unlock(&ContentKey::new(1, "rain"), 50)
        .await
        .unwrap();

    let err = remote
        .debit_and_unlock(&ContentKey::new(1, "pricey"), 500)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        RemoteError::Rejected { status: 402, ref code, .. } if code == "INSUFFICIENT_CREDITS"
    );
    assert_eq!(err.auth_failure(), None);
}
