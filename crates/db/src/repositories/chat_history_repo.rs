//! Repository for the `chat_histories` table.

use companion_core::chat::ChatMessage;
use companion_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::chat_history::ChatHistory;

/// One message array per (account, companion).
pub struct ChatHistoryRepo;

impl ChatHistoryRepo {
    /// Load a history. A conversation that never started is empty.
    pub async fn get(
        pool: &PgPool,
        account_id: DbId,
        companion_id: DbId,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let row: Option<(Json<Vec<ChatMessage>>,)> = sqlx::query_as(
            "SELECT messages FROM chat_histories WHERE account_id = $1 AND companion_id = $2",
        )
        .bind(account_id)
        .bind(companion_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(Json(messages),)| messages).unwrap_or_default())
    }

    /// Overwrite the full history (one write per completed turn).
    pub async fn put(
        pool: &PgPool,
        account_id: DbId,
        companion_id: DbId,
        messages: &[ChatMessage],
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO chat_histories (account_id, companion_id, messages)
             VALUES ($1, $2, $3)
             ON CONFLICT (account_id, companion_id) DO UPDATE SET messages = EXCLUDED.messages",
        )
        .bind(account_id)
        .bind(companion_id)
        .bind(Json(messages))
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &PgPool, account_id: DbId, companion_id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM chat_histories WHERE account_id = $1 AND companion_id = $2")
                .bind(account_id)
                .bind(companion_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every history of one account, used for the daily message allowance.
    pub async fn list_for_account(pool: &PgPool, account_id: DbId) -> Result<Vec<ChatHistory>, sqlx::Error> {
        sqlx::query_as::<_, ChatHistory>(
            "SELECT account_id, companion_id, messages, created_at, updated_at
             FROM chat_histories WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_all(pool)
        .await
    }
}
