//! `AppError` to HTTP response mapping, without a server.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use companion_api::error::AppError;
use companion_core::auth_messages::{AuthFailure, Locale};
use companion_core::error::CoreError;
use companion_genai::GenAiError;
use http_body_util::BodyExt;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let (status, json) = error_to_response(AppError::Core(CoreError::NotFound {
        entity: "Companion",
        id: 42,
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Companion with id 42 not found");
}

#[tokio::test]
async fn insufficient_credits_returns_402() {
    let (status, json) = error_to_response(AppError::Core(CoreError::InsufficientCredits {
        required: 50,
        available: 40,
    }))
    .await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(json["code"], "INSUFFICIENT_CREDITS");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("50") && message.contains("40"), "{message}");
}

#[tokio::test]
async fn validation_and_conflict_map_to_400_and_409() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Validation("bad amount".into()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "bad amount");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Conflict("already decided".into()))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn auth_failures_use_localized_messages() {
    let (status, json) =
        error_to_response(AppError::Auth(AuthFailure::InvalidCredentials, Locale::Bn)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "INVALID_CREDENTIALS");
    assert_eq!(
        json["error"],
        AuthFailure::InvalidCredentials.message(Locale::Bn)
    );

    let (status, _) = error_to_response(AppError::Auth(AuthFailure::AccountLocked, Locale::En)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = error_to_response(AppError::Auth(AuthFailure::EmailInUse, Locale::En)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn genai_errors_map_to_503_or_502() {
    let (status, json) = error_to_response(AppError::GenAi(GenAiError::NotConfigured)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "GENAI_UNAVAILABLE");

    let (status, json) = error_to_response(AppError::GenAi(GenAiError::Api {
        status: 500,
        body: "boom".into(),
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let (status, json) =
        error_to_response(AppError::InternalError("secret stack trace".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
