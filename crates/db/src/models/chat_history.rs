//! Per-companion chat history rows.

use companion_core::chat::ChatMessage;
use companion_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `chat_histories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatHistory {
    pub account_id: DbId,
    pub companion_id: DbId,
    pub messages: Json<Vec<ChatMessage>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
