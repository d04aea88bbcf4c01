//! Handlers for the `/companions` resource.
//!
//! Regular accounts see published profiles with locked gallery URLs
//! withheld. Admins manage the full records under `/admin/companions`.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use companion_core::chat::ChatMessage;
use companion_core::error::CoreError;
use companion_core::gallery::{redact_for_viewer, GalleryItemView};
use companion_core::profile::{validate_profile, ProfileContent, ProfileDraft};
use companion_core::types::{DbId, Timestamp};
use companion_db::models::companion::Companion;
use companion_db::repositories::{ChatHistoryRepo, CompanionRepo};
use companion_events::{names, PlatformEvent};
use serde::{Deserialize, Serialize};

use super::{load_account, load_published_companion};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireApproved};
use crate::response::DataResponse;
use crate::state::AppState;

/// Viewer-facing profile. The persona prompt never leaves the server.
#[derive(Debug, Serialize)]
pub struct CompanionView {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub age: i32,
    pub tagline: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub gallery: Vec<GalleryItemView>,
    pub updated_at: Timestamp,
}

impl CompanionView {
    fn for_viewer(companion: &Companion, unlocked: &BTreeSet<String>) -> Self {
        Self {
            id: companion.id,
            slug: companion.slug.clone(),
            name: companion.name.clone(),
            age: companion.age,
            tagline: companion.tagline.clone(),
            bio: companion.bio.clone(),
            avatar_url: companion.avatar_url.clone(),
            gallery: redact_for_viewer(companion.id, &companion.gallery.0, unlocked),
            updated_at: companion.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateProfileRequest {
    pub brief: String,
}

async fn unlocked_set(state: &AppState, account_id: DbId) -> AppResult<BTreeSet<String>> {
    let account = load_account(&state.pool, account_id).await?;
    Ok(account.unlocked_content.into_iter().collect())
}

/// GET /api/v1/companions
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<CompanionView>>>> {
    let unlocked = unlocked_set(&state, auth_user.account_id).await?;
    let companions = CompanionRepo::list(&state.pool, false).await?;
    let data = companions
        .iter()
        .map(|c| CompanionView::for_viewer(c, &unlocked))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/companions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CompanionView>>> {
    let unlocked = unlocked_set(&state, auth_user.account_id).await?;
    let companion = load_published_companion(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: CompanionView::for_viewer(&companion, &unlocked),
    }))
}

/// GET /api/v1/companions/{id}/history
pub async fn get_history(
    State(state): State<AppState>,
    RequireApproved(account): RequireApproved,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ChatMessage>>>> {
    load_published_companion(&state.pool, id).await?;
    let messages = ChatHistoryRepo::get(&state.pool, account.id, id).await?;
    Ok(Json(DataResponse { data: messages }))
}

/// DELETE /api/v1/companions/{id}/history
pub async fn clear_history(
    State(state): State<AppState>,
    RequireApproved(account): RequireApproved,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ChatHistoryRepo::delete(&state.pool, account.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/companions
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Companion>>>> {
    let companions = CompanionRepo::list(&state.pool, true).await?;
    Ok(Json(DataResponse { data: companions }))
}

/// POST /api/v1/admin/companions
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ProfileContent>,
) -> AppResult<(StatusCode, Json<DataResponse<Companion>>)> {
    validate_profile(&input)?;
    let companion = CompanionRepo::create(&state.pool, &input).await?;

    tracing::info!(companion_id = companion.id, slug = %companion.slug, "Companion created");
    state.event_bus.publish(
        PlatformEvent::new(names::COMPANION_CREATED)
            .with_source("companion", companion.id)
            .with_actor(admin.account_id),
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: companion })))
}

/// PUT /api/v1/admin/companions/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ProfileContent>,
) -> AppResult<Json<DataResponse<Companion>>> {
    validate_profile(&input)?;
    let companion = CompanionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Companion",
            id,
        })?;

    state.event_bus.publish(
        PlatformEvent::new(names::COMPANION_UPDATED)
            .with_source("companion", id)
            .with_actor(admin.account_id),
    );
    Ok(Json(DataResponse { data: companion }))
}

/// DELETE /api/v1/admin/companions/{id}
///
/// Chat histories with the companion are removed by the foreign-key cascade.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CompanionRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Companion",
            id,
        }
        .into());
    }
    state.event_bus.publish(
        PlatformEvent::new(names::COMPANION_DELETED)
            .with_source("companion", id)
            .with_actor(admin.account_id),
    );
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/companions/{id}/gallery/{item_id}
///
/// Accounts that already unlocked the item keep the key in their set.
pub async fn delete_gallery_item(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((id, item_id)): Path<(DbId, String)>,
) -> AppResult<Json<DataResponse<Companion>>> {
    let companion = CompanionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Companion",
            id,
        })?;
    if companion.find_item(&item_id).is_none() {
        return Err(AppError::NotFound(format!(
            "Gallery item '{item_id}' not found on companion {id}"
        )));
    }

    let mut content = companion.content();
    content.gallery.retain(|item| item.id != item_id);
    let companion = CompanionRepo::update(&state.pool, id, &content)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Companion",
            id,
        })?;

    state.event_bus.publish(
        PlatformEvent::new(names::COMPANION_UPDATED)
            .with_source("companion", id)
            .with_actor(admin.account_id)
            .with_payload(serde_json::json!({ "removed_item": item_id })),
    );
    Ok(Json(DataResponse { data: companion }))
}

/// POST /api/v1/admin/companions/generate
///
/// Drafts a profile from a short brief. Nothing is saved.
pub async fn generate(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<GenerateProfileRequest>,
) -> AppResult<Json<DataResponse<ProfileDraft>>> {
    let brief = input.brief.trim();
    if brief.is_empty() {
        return Err(CoreError::Validation("Brief must not be empty".into()).into());
    }
    let draft = state.genai.generate_profile(brief).await?;
    Ok(Json(DataResponse { data: draft }))
}
