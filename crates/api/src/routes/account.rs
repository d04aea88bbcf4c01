use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// Routes mounted at `/account`.
///
/// ```text
/// GET  /                  -> get_me
/// PUT  /name              -> update_name
/// POST /age-verification  -> verify_age
/// POST /unlocks           -> unlock (approved accounts)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(account::get_me))
        .route("/name", put(account::update_name))
        .route("/age-verification", post(account::verify_age))
        .route("/unlocks", post(account::unlock))
}
