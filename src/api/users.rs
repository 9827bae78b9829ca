//! User administration endpoints
//!
//! Account management is restricted to super admins. Responses go through
//! [`UserResponse`] so password hashes never leave the service layer.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;

use crate::api::auth::UserResponse;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CreateUserInput, ListParams, NewActivityLog, PagedResult, UpdateUserInput};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Build user management routes at /api/admin/users (super admin only)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/", post(create_user))
        .route("/{id}", get(get_user))
        .route("/{id}", put(update_user))
        .route("/{id}", delete(delete_user))
}

/// GET /api/admin/users
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<PagedResult<UserResponse>>, ApiError> {
    let params = ListParams::new(query.page.unwrap_or(1), query.per_page.unwrap_or(20));
    let page = state.user_service.list_users(&params).await?;

    Ok(Json(page.map(UserResponse::from)))
}

/// GET /api/admin/users/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get_user(id).await?;

    Ok(Json(UserResponse::from(user)))
}

/// POST /api/admin/users
async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Json(input): Json<CreateUserInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.user_service.create_user(input).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(actor.0.id, "user.create", "user", user.id)
                .in_nursery(user.nursery_id)
                .with_detail(user.username.clone()),
        )
        .await;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// PUT /api/admin/users/{id}
async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateUserInput>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.update_user(id, input).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(actor.0.id, "user.update", "user", id)
                .in_nursery(user.nursery_id),
        )
        .await;

    Ok(Json(UserResponse::from(user)))
}

/// DELETE /api/admin/users/{id}
async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if actor.0.id == id {
        return Err(ApiError::validation_error(
            "Cannot delete your own account".to_string(),
        ));
    }

    state.user_service.delete_user(id).await?;

    state
        .activity_service
        .record(NewActivityLog::new(actor.0.id, "user.delete", "user", id))
        .await;

    Ok(StatusCode::NO_CONTENT)
}
