//! Repository for the `companions` table.

use companion_core::profile::ProfileContent;
use companion_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::companion::Companion;

const COLUMNS: &str = "id, slug, name, age, tagline, bio, persona_prompt, avatar_url, \
                        voice_name, gallery, is_published, sort_order, created_at, updated_at";

/// Companion profiles and their galleries.
pub struct CompanionRepo;

impl CompanionRepo {
    /// List profiles in display order. Unpublished rows only when asked for.
    pub async fn list(pool: &PgPool, include_unpublished: bool) -> Result<Vec<Companion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM companions
             WHERE ($1 OR is_published)
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Companion>(&query)
            .bind(include_unpublished)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Companion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companions WHERE id = $1");
        sqlx::query_as::<_, Companion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &ProfileContent) -> Result<Companion, sqlx::Error> {
        let query = format!(
            "INSERT INTO companions
                (slug, name, age, tagline, bio, persona_prompt, avatar_url, voice_name,
                 gallery, is_published, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Companion>(&query)
            .bind(&input.slug)
            .bind(&input.name)
            .bind(input.age)
            .bind(&input.tagline)
            .bind(&input.bio)
            .bind(&input.persona_prompt)
            .bind(&input.avatar_url)
            .bind(&input.voice_name)
            .bind(Json(&input.gallery))
            .bind(input.is_published)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Replace every authored field of a profile.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ProfileContent,
    ) -> Result<Option<Companion>, sqlx::Error> {
        let query = format!(
            "UPDATE companions SET
                slug = $2, name = $3, age = $4, tagline = $5, bio = $6,
                persona_prompt = $7, avatar_url = $8, voice_name = $9,
                gallery = $10, is_published = $11, sort_order = $12
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Companion>(&query)
            .bind(id)
            .bind(&input.slug)
            .bind(&input.name)
            .bind(input.age)
            .bind(&input.tagline)
            .bind(&input.bio)
            .bind(&input.persona_prompt)
            .bind(&input.avatar_url)
            .bind(&input.voice_name)
            .bind(Json(&input.gallery))
            .bind(input.is_published)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM companions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert `defaults` when the table holds no profiles at all.
    ///
    /// Returns how many rows were inserted (0 when the store was already populated).
    pub async fn seed_if_empty(pool: &PgPool, defaults: &[ProfileContent]) -> Result<usize, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companions")
            .fetch_one(pool)
            .await?;
        if count > 0 {
            return Ok(0);
        }
        for profile in defaults {
            Self::create(pool, profile).await?;
        }
        Ok(defaults.len())
    }
}
