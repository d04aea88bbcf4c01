use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// GET  /         -> list_mine
/// POST /         -> submit
/// GET  /catalog  -> catalog
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(payments::list_mine).post(payments::submit))
        .route("/catalog", get(payments::catalog))
}

/// Routes mounted at `/admin/payments`.
///
/// ```text
/// GET  /              -> admin_list (?status, limit, offset)
/// POST /{id}/approve  -> approve
/// POST /{id}/reject   -> reject
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(payments::admin_list))
        .route("/{id}/approve", post(payments::approve))
        .route("/{id}/reject", post(payments::reject))
}
