pub mod account;
pub mod admin;
pub mod auth;
pub mod companions;
pub mod health;
pub mod payments;
pub mod referrals;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                              register (public)
/// /auth/login                                 login (public)
/// /auth/refresh                               refresh (public)
/// /auth/logout                                logout (requires auth)
///
/// /account                                    own account (GET)
/// /account/name                               set display name (PUT)
/// /account/age-verification                   confirm age (POST)
/// /account/unlocks                            unlock gallery item (POST)
///
/// /companions                                 list published profiles
/// /companions/{id}                            get profile
/// /companions/{id}/history                    get, clear (GET, DELETE)
/// /companions/{id}/chat                       send a turn (POST, SSE reply)
/// /companions/{id}/speech                     voice reply (POST)
///
/// /payments                                   list own, submit (GET, POST)
/// /referrals/{code}                           look up a code (GET)
///
/// /admin/accounts                             list (admin only)
/// /admin/accounts/{id}/approval               set approval (POST)
/// /admin/accounts/{id}/credits                grant credits (POST)
///
/// /admin/companions                           list, create (GET, POST)
/// /admin/companions/generate                  AI profile draft (POST)
/// /admin/companions/{id}                      update, delete (PUT, DELETE)
/// /admin/companions/{id}/gallery/{item_id}    remove gallery item (DELETE)
///
/// /admin/payments                             review queue (GET)
/// /admin/payments/{id}/approve                approve (POST)
/// /admin/payments/{id}/reject                 reject (POST)
///
/// /admin/referrals                            list, create (GET, POST)
/// /admin/referrals/transactions               commission ledger (GET)
/// /admin/referrals/{id}                       deactivate (DELETE)
///
/// /admin/events                               audit log (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/account", account::router())
        .nest("/companions", companions::router())
        .nest("/payments", payments::router())
        .nest("/referrals", referrals::router())
        .nest("/admin/accounts", admin::accounts_router())
        .nest("/admin/companions", companions::admin_router())
        .nest("/admin/payments", payments::admin_router())
        .nest("/admin/referrals", referrals::admin_router())
        .nest("/admin/events", admin::events_router())
}
