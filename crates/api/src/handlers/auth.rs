//! Handlers for the `/auth` resource (register, login, refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use companion_core::auth_messages::{AuthFailure, Locale};
use companion_core::roles::{ROLE_ADMIN, ROLE_USER};
use companion_db::models::account::{Account, AccountResponse, CreateAccount};
use companion_db::models::session::CreateSession;
use companion_db::repositories::{AccountRepo, SessionRepo};
use companion_events::{names, PlatformEvent};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, is_strong_enough, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Consecutive failed logins before the account is locked.
const MAX_FAILED_ATTEMPTS: i32 = 5;

const LOCK_DURATION_MINS: i64 = 15;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
    #[serde(default)]
    pub locale: Locale,
}

/// Returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub account: AccountResponse,
}

/// POST /api/v1/auth/register
///
/// Creates an unapproved free account with no credits. Emails listed in
/// `ADMIN_EMAILS` register as approved admins.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(&input.email);
    if !email.contains('@') || email.len() < 3 {
        return Err(AppError::BadRequest("A valid email address is required".into()));
    }
    if !is_strong_enough(&input.password) {
        return Err(AppError::Auth(AuthFailure::WeakPassword, input.locale));
    }
    if AccountRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Auth(AuthFailure::EmailInUse, input.locale));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let is_admin = state.config.is_admin_email(&email);
    let display_name = input
        .display_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let mut account = AccountRepo::create(
        &state.pool,
        &CreateAccount {
            email,
            password_hash,
            display_name,
            role: if is_admin { ROLE_ADMIN } else { ROLE_USER }.to_string(),
        },
    )
    .await?;
    if is_admin {
        account = AccountRepo::set_approved(&state.pool, account.id, true)
            .await?
            .unwrap_or(account);
    }

    tracing::info!(account_id = account.id, is_admin, "Account registered");
    state.event_bus.publish(
        PlatformEvent::new(names::ACCOUNT_CREATED)
            .with_source("account", account.id)
            .with_actor(account.id),
    );

    let response = create_auth_response(&state, &account).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let locale = input.locale;
    let account = AccountRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or(AppError::Auth(AuthFailure::InvalidCredentials, locale))?;

    if !account.is_active {
        return Err(AppError::Auth(AuthFailure::AccountDisabled, locale));
    }
    if account.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(AppError::Auth(AuthFailure::AccountLocked, locale));
    }

    let password_valid = verify_password(&input.password, &account.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        AccountRepo::increment_failed_login(&state.pool, account.id).await?;
        if account.failed_login_count + 1 >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            AccountRepo::lock_account(&state.pool, account.id, lock_until).await?;
            tracing::warn!(account_id = account.id, "Account locked after failed logins");
        }
        return Err(AppError::Auth(AuthFailure::InvalidCredentials, locale));
    }

    AccountRepo::record_successful_login(&state.pool, account.id).await?;
    Ok(Json(create_auth_response(&state, &account).await?))
}

/// POST /api/v1/auth/refresh
///
/// Rotates the refresh token: the presented one is revoked.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let expired = || AppError::Auth(AuthFailure::SessionExpired, input.locale);

    let token_hash = hash_refresh_token(&input.refresh_token);
    let session = SessionRepo::find_active_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(expired)?;
    SessionRepo::revoke(&state.pool, session.id).await?;

    let account = AccountRepo::find_by_id(&state.pool, session.account_id)
        .await?
        .ok_or_else(expired)?;
    if !account.is_active {
        return Err(AppError::Auth(AuthFailure::AccountDisabled, input.locale));
    }

    Ok(Json(create_auth_response(&state, &account).await?))
}

/// POST /api/v1/auth/logout
///
/// Revokes every session of the caller. 204.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_account(&state.pool, auth_user.account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

async fn create_auth_response(state: &AppState, account: &Account) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(account.id, &account.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            account_id: account.id,
            refresh_token_hash: refresh_hash,
            expires_at,
            user_agent: None,
            ip_address: None,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        account: account.to_response()?,
    })
}
