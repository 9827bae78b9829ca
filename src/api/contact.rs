//! Contact form endpoints
//!
//! Submission is public and unauthenticated; the inbox is admin-only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{
    ContactSubmission, CreateContactInput, ListParams, NewActivityLog, PagedResult,
};

#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Build the public submission route at /api/contact
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", post(submit_contact))
}

/// Build the inbox routes at /api/admin/contact
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_submissions))
        .route("/{id}", delete(delete_submission))
}

/// POST /api/contact
async fn submit_contact(
    State(state): State<AppState>,
    Json(input): Json<CreateContactInput>,
) -> Result<impl IntoResponse, ApiError> {
    let submission = state.contact_service.submit(input).await?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /api/admin/contact
async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<PagedResult<ContactSubmission>>, ApiError> {
    let params = ListParams::new(query.page.unwrap_or(1), query.per_page.unwrap_or(20));

    Ok(Json(state.contact_service.list(&params).await?))
}

/// DELETE /api/admin/contact/{id}
async fn delete_submission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.contact_service.delete(id).await?;

    state
        .activity_service
        .record(NewActivityLog::new(
            user.0.id,
            "contact.delete",
            "contact_submission",
            id,
        ))
        .await;

    Ok(StatusCode::NO_CONTENT)
}
