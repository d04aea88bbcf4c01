#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use companion_api::auth::jwt::JwtConfig;
use companion_api::config::ServerConfig;
use companion_api::router::build_app_router;
use companion_api::state::AppState;
use companion_core::types::{Credits, DbId};
use companion_db::repositories::AccountRepo;
use companion_events::EventBus;
use companion_genai::{GenAiClient, GenAiConfig};

pub const ADMIN_EMAIL: &str = "admin@test.com";
pub const PASSWORD: &str = "test_password_123!";

/// Test `ServerConfig` with safe defaults. `admin@test.com` registers as admin.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        subscription_sweep_interval_secs: 3600,
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 30,
        },
    }
}

/// GenAI settings pointing at `base_url`. An empty key disables the client.
pub fn genai_config(base_url: &str, api_key: &str) -> GenAiConfig {
    GenAiConfig {
        api_key: api_key.to_string(),
        base_url: base_url.to_string(),
        chat_model: "chat-model".to_string(),
        speech_model: "speech-model".to_string(),
        profile_model: "profile-model".to_string(),
        request_timeout: Duration::from_secs(5),
    }
}

/// Full application router without a generative-AI key.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_genai(pool, genai_config("http://127.0.0.1:9", ""))
}

pub fn build_test_app_with_genai(pool: PgPool, genai: GenAiConfig) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
        genai: Arc::new(GenAiClient::new(genai)),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, json_request("GET", uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, json_request("GET", uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, json_request("POST", uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, json_request("POST", uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, json_request("POST", uri, Some(token), None)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, json_request("PUT", uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, json_request("DELETE", uri, Some(token), None)).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).expect("response body should be UTF-8")
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// A registered account and its access token.
pub struct TestAccount {
    pub id: DbId,
    pub token: String,
    pub refresh_token: String,
}

/// Register through the API.
pub async fn register(app: Router, email: &str) -> TestAccount {
    let body = serde_json::json!({ "email": email, "password": PASSWORD });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    TestAccount {
        id: json["account"]["id"].as_i64().expect("account id"),
        token: json["access_token"].as_str().unwrap().to_string(),
        refresh_token: json["refresh_token"].as_str().unwrap().to_string(),
    }
}

pub async fn register_admin(app: Router) -> TestAccount {
    register(app, ADMIN_EMAIL).await
}

/// Register, approve and fund an account directly in the database.
pub async fn approved_account(app: Router, pool: &PgPool, email: &str, credits: Credits) -> TestAccount {
    let account = register(app, email).await;
    AccountRepo::set_approved(pool, account.id, true)
        .await
        .unwrap()
        .expect("account exists");
    if credits > 0 {
        AccountRepo::grant_credits(pool, account.id, credits)
            .await
            .unwrap()
            .expect("account exists");
    }
    account
}
