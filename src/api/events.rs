//! Event API endpoints
//!
//! Public listings show a nursery's upcoming events by location slug;
//! admin routes manage events under /api/admin/nurseries/{nursery_id}/events
//! with the per-nursery access check applied.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{check_nursery_access, ApiError, AppState, AuthenticatedUser};
use crate::models::{
    CreateEventInput, Event, ListParams, NewActivityLog, PagedResult, UpdateEventInput,
};

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// When true, only events that have not started yet
    #[serde(default)]
    pub upcoming: bool,
}

impl EventListQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), self.per_page.unwrap_or(20))
    }
}

/// Build public event routes, nested under /api/nurseries/{location}
pub fn public_router() -> Router<AppState> {
    Router::new().route("/{location}/events", get(list_public_events))
}

/// Build admin event routes, nested under /api/admin/nurseries/{nursery_id}
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/{nursery_id}/events", get(list_events))
        .route("/{nursery_id}/events", post(create_event))
        .route("/{nursery_id}/events/{id}", get(get_event))
        .route("/{nursery_id}/events/{id}", put(update_event))
        .route("/{nursery_id}/events/{id}", delete(delete_event))
}

/// GET /api/nurseries/{location}/events
async fn list_public_events(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<PagedResult<Event>>, ApiError> {
    let nursery = state.nursery_service.get_by_location(&location).await?;

    if query.upcoming {
        let events = state.event_service.list_upcoming(nursery.id).await?;
        let params = query.params();
        let total = events.len() as i64;
        let items = events
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();
        return Ok(Json(PagedResult::new(items, total, &params)));
    }

    Ok(Json(
        state.event_service.list(nursery.id, &query.params()).await?,
    ))
}

/// GET /api/admin/nurseries/{nursery_id}/events
async fn list_events(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(nursery_id): Path<i64>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<PagedResult<Event>>, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    Ok(Json(
        state.event_service.list(nursery_id, &query.params()).await?,
    ))
}

/// GET /api/admin/nurseries/{nursery_id}/events/{id}
async fn get_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((nursery_id, id)): Path<(i64, i64)>,
) -> Result<Json<Event>, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    Ok(Json(state.event_service.get(nursery_id, id).await?))
}

/// POST /api/admin/nurseries/{nursery_id}/events
async fn create_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(nursery_id): Path<i64>,
    Json(input): Json<CreateEventInput>,
) -> Result<impl IntoResponse, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    let event = state
        .event_service
        .create(nursery_id, Some(user.0.id), input)
        .await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "event.create", "event", event.id)
                .in_nursery(Some(nursery_id))
                .with_detail(event.title.clone()),
        )
        .await;

    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/admin/nurseries/{nursery_id}/events/{id}
async fn update_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((nursery_id, id)): Path<(i64, i64)>,
    Json(input): Json<UpdateEventInput>,
) -> Result<Json<Event>, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    let event = state.event_service.update(nursery_id, id, input).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "event.update", "event", id)
                .in_nursery(Some(nursery_id)),
        )
        .await;

    Ok(Json(event))
}

/// DELETE /api/admin/nurseries/{nursery_id}/events/{id}
async fn delete_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((nursery_id, id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    state.event_service.delete(nursery_id, id).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "event.delete", "event", id)
                .in_nursery(Some(nursery_id)),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
