//! Route definitions for admin-only resources without a public side.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin::{accounts, events};
use crate::state::AppState;

/// Routes mounted at `/admin/accounts`.
///
/// ```text
/// GET  /                -> list (?pending_only, limit, offset)
/// POST /{id}/approval   -> set_approval
/// POST /{id}/credits    -> grant_credits
/// ```
pub fn accounts_router() -> Router<AppState> {
    Router::new()
        .route("/", get(accounts::list))
        .route("/{id}/approval", post(accounts::set_approval))
        .route("/{id}/credits", post(accounts::grant_credits))
}

/// Routes mounted at `/admin/events`.
pub fn events_router() -> Router<AppState> {
    Router::new().route("/", get(events::list))
}
