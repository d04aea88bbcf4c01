//! Role and approval extractors built on [`AuthUser`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use companion_core::error::CoreError;
use companion_db::models::account::Account;
use companion_db::repositories::AccountRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires an active account that an admin (or an approved payment) has
/// approved. Carries the freshly loaded account row.
pub struct RequireApproved(pub Account);

impl FromRequestParts<AppState> for RequireApproved {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let account = AccountRepo::find_by_id(&state.pool, user.account_id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account no longer exists".into())))?;

        if !account.is_active {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is deactivated".into(),
            )));
        }
        if !account.approved && !account.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is awaiting approval".into(),
            )));
        }
        Ok(RequireApproved(account))
    }
}
