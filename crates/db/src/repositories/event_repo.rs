//! Repository for the `events` audit table.

use companion_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::Event;

pub struct EventRepo;

impl EventRepo {
    /// Append one event, returning its id.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_account_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO events (event_type, source_entity_type, source_entity_id, actor_account_id, payload)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(event_type)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor_account_id)
        .bind(payload)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }

    /// Most recent events first, optionally filtered by type.
    pub async fn list_recent(
        pool: &PgPool,
        event_type: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "SELECT id, event_type, source_entity_type, source_entity_id, actor_account_id,
                    payload, created_at
             FROM events
             WHERE ($1::TEXT IS NULL OR event_type = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2",
        )
        .bind(event_type)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
