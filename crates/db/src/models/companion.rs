//! Companion profile model.

use companion_core::error::CoreError;
use companion_core::gallery::GalleryItem;
use companion_core::profile::ProfileContent;
use companion_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `companions` table. The gallery is stored as one JSONB array.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Companion {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub age: i32,
    pub tagline: Option<String>,
    pub bio: Option<String>,
    pub persona_prompt: String,
    pub avatar_url: Option<String>,
    pub voice_name: Option<String>,
    pub gallery: Json<Vec<GalleryItem>>,
    pub is_published: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Companion {
    pub fn find_item(&self, item_id: &str) -> Option<&GalleryItem> {
        self.gallery.0.iter().find(|item| item.id == item_id)
    }

    /// Authored content of this row, e.g. to re-save after a gallery edit.
    pub fn content(&self) -> ProfileContent {
        ProfileContent {
            slug: self.slug.clone(),
            name: self.name.clone(),
            age: self.age,
            tagline: self.tagline.clone(),
            bio: self.bio.clone(),
            persona_prompt: self.persona_prompt.clone(),
            avatar_url: self.avatar_url.clone(),
            voice_name: self.voice_name.clone(),
            gallery: self.gallery.0.clone(),
            is_published: self.is_published,
            sort_order: self.sort_order,
        }
    }

    /// Error for a gallery item missing from this companion.
    pub fn item_not_found(&self, item_id: &str) -> CoreError {
        CoreError::Validation(format!(
            "Companion {} has no gallery item '{item_id}'",
            self.id
        ))
    }
}
