//! Nursery API endpoints
//!
//! Public site endpoints resolve nurseries by their location slug;
//! admin endpoints manage them by id. Creating, updating and deleting
//! nurseries is reserved for super admins.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CreateNurseryInput, NewActivityLog, Nursery, UpdateNurseryInput};

/// Build public nursery routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_nurseries))
        .route("/{location}", get(get_nursery_by_location))
}

/// Build admin nursery routes for super admins
pub fn super_admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_nursery))
        .route("/{id}", put(update_nursery))
        .route("/{id}", delete(delete_nursery))
}

/// Build admin nursery routes available to any authenticated user
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_nurseries))
        .route("/{id}", get(get_nursery_by_id))
}

/// GET /api/nurseries
async fn list_nurseries(State(state): State<AppState>) -> Result<Json<Vec<Nursery>>, ApiError> {
    Ok(Json(state.nursery_service.list().await?))
}

/// GET /api/nurseries/{location}
async fn get_nursery_by_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<Json<Nursery>, ApiError> {
    Ok(Json(state.nursery_service.get_by_location(&location).await?))
}

/// GET /api/admin/nurseries/{id}
async fn get_nursery_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Nursery>, ApiError> {
    Ok(Json(state.nursery_service.get(id).await?))
}

/// POST /api/admin/nurseries
async fn create_nursery(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(input): Json<CreateNurseryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let nursery = state.nursery_service.create(input).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "nursery.create", "nursery", nursery.id)
                .in_nursery(Some(nursery.id))
                .with_detail(nursery.name.clone()),
        )
        .await;

    Ok((StatusCode::CREATED, Json(nursery)))
}

/// PUT /api/admin/nurseries/{id}
async fn update_nursery(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateNurseryInput>,
) -> Result<Json<Nursery>, ApiError> {
    let nursery = state.nursery_service.update(id, input).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "nursery.update", "nursery", id)
                .in_nursery(Some(id)),
        )
        .await;

    Ok(Json(nursery))
}

/// DELETE /api/admin/nurseries/{id}
async fn delete_nursery(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.nursery_service.delete(id).await?;

    state
        .activity_service
        .record(NewActivityLog::new(user.0.id, "nursery.delete", "nursery", id))
        .await;

    Ok(StatusCode::NO_CONTENT)
}
