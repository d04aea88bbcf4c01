//! Read access to the persisted audit log.

use axum::extract::{Query, State};
use axum::Json;
use companion_db::models::event::Event;
use companion_db::repositories::EventRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{EventListParams, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/events
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<EventListParams>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    let limit = PaginationParams {
        limit: params.limit,
        offset: None,
    }
    .limit();
    let events = EventRepo::list_recent(&state.pool, params.event_type.as_deref(), limit).await?;
    Ok(Json(DataResponse { data: events }))
}
