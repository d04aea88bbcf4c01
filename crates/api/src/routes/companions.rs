//! Route definitions for companion profiles and conversations.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{chat, companions};
use crate::state::AppState;

/// Routes mounted at `/companions`.
///
/// ```text
/// GET    /               -> list
/// GET    /{id}           -> get_by_id
/// GET    /{id}/history   -> get_history
/// DELETE /{id}/history   -> clear_history
/// POST   /{id}/chat      -> send_message (SSE)
/// POST   /{id}/speech    -> synthesize_reply
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(companions::list))
        .route("/{id}", get(companions::get_by_id))
        .route(
            "/{id}/history",
            get(companions::get_history).delete(companions::clear_history),
        )
        .route("/{id}/chat", post(chat::send_message))
        .route("/{id}/speech", post(chat::synthesize_reply))
}

/// Routes mounted at `/admin/companions`.
///
/// ```text
/// GET    /                          -> admin_list
/// POST   /                          -> create
/// POST   /generate                  -> generate
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// DELETE /{id}/gallery/{item_id}    -> delete_gallery_item
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(companions::admin_list).post(companions::create))
        .route("/generate", post(companions::generate))
        .route("/{id}", put(companions::update).delete(companions::delete))
        .route("/{id}/gallery/{item_id}", delete(companions::delete_gallery_item))
}
