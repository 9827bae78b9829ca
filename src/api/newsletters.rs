//! Newsletter API endpoints
//!
//! Public listings fold chain-wide broadcasts into each nursery's
//! newsletters. Broadcast management lives at /api/admin/newsletters and
//! is reserved for super admins.

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
    CreateNewsletterInput, ListParams, NewActivityLog, Newsletter, PagedResult,
    UpdateNewsletterInput,
};

#[derive(Debug, Deserialize)]
pub struct NewsletterListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl NewsletterListQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), self.per_page.unwrap_or(20))
    }
}

/// Build public newsletter routes, nested under /api/nurseries/{location}
pub fn public_router() -> Router<AppState> {
    Router::new().route("/{location}/newsletters", get(list_public_newsletters))
}

/// Build admin newsletter routes, nested under /api/admin/nurseries/{nursery_id}
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/{nursery_id}/newsletters", get(list_newsletters))
        .route("/{nursery_id}/newsletters", post(create_newsletter))
        .route("/{nursery_id}/newsletters/{id}", get(get_newsletter))
        .route("/{nursery_id}/newsletters/{id}", put(update_newsletter))
        .route("/{nursery_id}/newsletters/{id}", delete(delete_newsletter))
}

/// Build broadcast routes at /api/admin/newsletters (super admin only)
pub fn broadcast_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_broadcasts))
        .route("/", post(create_broadcast))
        .route("/{id}", put(update_broadcast))
        .route("/{id}", delete(delete_broadcast))
}

/// GET /api/nurseries/{location}/newsletters
///
/// Includes broadcasts alongside the nursery's own newsletters.
async fn list_public_newsletters(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Query(query): Query<NewsletterListQuery>,
) -> Result<Json<PagedResult<Newsletter>>, ApiError> {
    let nursery = state.nursery_service.get_by_location(&location).await?;

    Ok(Json(
        state
            .newsletter_service
            .list(
                nursery.id,
                true,
                query.tag.clone(),
                query.search.clone(),
                &query.params(),
            )
            .await?,
    ))
}

/// GET /api/admin/nurseries/{nursery_id}/newsletters
async fn list_newsletters(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(nursery_id): Path<i64>,
    Query(query): Query<NewsletterListQuery>,
) -> Result<Json<PagedResult<Newsletter>>, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    Ok(Json(
        state
            .newsletter_service
            .list(
                nursery_id,
                false,
                query.tag.clone(),
                query.search.clone(),
                &query.params(),
            )
            .await?,
    ))
}

/// GET /api/admin/nurseries/{nursery_id}/newsletters/{id}
async fn get_newsletter(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((nursery_id, id)): Path<(i64, i64)>,
) -> Result<Json<Newsletter>, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    Ok(Json(state.newsletter_service.get(nursery_id, id).await?))
}

/// POST /api/admin/nurseries/{nursery_id}/newsletters
async fn create_newsletter(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(nursery_id): Path<i64>,
    Json(input): Json<CreateNewsletterInput>,
) -> Result<impl IntoResponse, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    let newsletter = state.newsletter_service.create(nursery_id, input).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "newsletter.create", "newsletter", newsletter.id)
                .in_nursery(Some(nursery_id))
                .with_detail(newsletter.title.clone()),
        )
        .await;

    Ok((StatusCode::CREATED, Json(newsletter)))
}

/// PUT /api/admin/nurseries/{nursery_id}/newsletters/{id}
async fn update_newsletter(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((nursery_id, id)): Path<(i64, i64)>,
    Json(input): Json<UpdateNewsletterInput>,
) -> Result<Json<Newsletter>, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    let newsletter = state.newsletter_service.update(nursery_id, id, input).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "newsletter.update", "newsletter", id)
                .in_nursery(Some(nursery_id)),
        )
        .await;

    Ok(Json(newsletter))
}

/// DELETE /api/admin/nurseries/{nursery_id}/newsletters/{id}
async fn delete_newsletter(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((nursery_id, id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    state.newsletter_service.delete(nursery_id, id).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "newsletter.delete", "newsletter", id)
                .in_nursery(Some(nursery_id)),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/newsletters
async fn list_broadcasts(
    State(state): State<AppState>,
    Query(query): Query<NewsletterListQuery>,
) -> Result<Json<PagedResult<Newsletter>>, ApiError> {
    Ok(Json(
        state.newsletter_service.list_broadcasts(&query.params()).await?,
    ))
}

/// POST /api/admin/newsletters
async fn create_broadcast(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(input): Json<CreateNewsletterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let newsletter = state.newsletter_service.create_broadcast(input).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "newsletter.broadcast", "newsletter", newsletter.id)
                .with_detail(newsletter.title.clone()),
        )
        .await;

    Ok((StatusCode::CREATED, Json(newsletter)))
}

/// PUT /api/admin/newsletters/{id}
async fn update_broadcast(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateNewsletterInput>,
) -> Result<Json<Newsletter>, ApiError> {
    let newsletter = state.newsletter_service.update_broadcast(id, input).await?;

    state
        .activity_service
        .record(NewActivityLog::new(
            user.0.id,
            "newsletter.broadcast.update",
            "newsletter",
            id,
        ))
        .await;

    Ok(Json(newsletter))
}

/// DELETE /api/admin/newsletters/{id}
async fn delete_broadcast(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.newsletter_service.delete_broadcast(id).await?;

    state
        .activity_service
        .record(NewActivityLog::new(
            user.0.id,
            "newsletter.broadcast.delete",
            "newsletter",
            id,
        ))
        .await;

    Ok(StatusCode::NO_CONTENT)
}
