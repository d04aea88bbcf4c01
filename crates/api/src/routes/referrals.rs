use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::referrals;
use crate::state::AppState;

/// Routes mounted at `/referrals`.
///
/// ```text
/// GET /{code}  -> lookup
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{code}", get(referrals::lookup))
}

/// Routes mounted at `/admin/referrals`.
///
/// ```text
/// GET    /                 -> admin_list
/// POST   /                 -> create
/// GET    /transactions     -> transactions (?referral_id)
/// DELETE /{id}             -> deactivate
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(referrals::admin_list).post(referrals::create))
        .route("/transactions", get(referrals::transactions))
        .route("/{id}", delete(referrals::deactivate))
}
