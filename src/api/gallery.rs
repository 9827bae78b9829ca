//! Gallery API endpoints
//!
//! Public listings only ever show published images. Admin listings expose
//! the full draft → published → archived pipeline plus category management.

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
    CreateGalleryCategoryInput, CreateGalleryImageInput, GalleryCategory, GalleryImage,
    ImageStatus, ListParams, NewActivityLog, PagedResult, UpdateGalleryImageInput,
};

#[derive(Debug, Deserialize)]
pub struct GalleryListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category_id: Option<i64>,
    pub featured: Option<bool>,
    pub status: Option<ImageStatus>,
    pub search: Option<String>,
}

impl GalleryListQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), self.per_page.unwrap_or(20))
    }
}

/// Build public gallery routes, nested under /api/nurseries/{location}
pub fn public_router() -> Router<AppState> {
    Router::new().route("/{location}/gallery", get(list_public_gallery))
}

/// Build admin gallery routes, nested under /api/admin/nurseries/{nursery_id}
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/{nursery_id}/gallery", get(list_gallery))
        .route("/{nursery_id}/gallery", post(create_image))
        .route("/{nursery_id}/gallery/categories", get(list_categories))
        .route("/{nursery_id}/gallery/categories", post(create_category))
        .route(
            "/{nursery_id}/gallery/categories/{id}",
            delete(delete_category),
        )
        .route("/{nursery_id}/gallery/{id}", get(get_image))
        .route("/{nursery_id}/gallery/{id}", put(update_image))
        .route("/{nursery_id}/gallery/{id}", delete(delete_image))
}

/// GET /api/nurseries/{location}/gallery
async fn list_public_gallery(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Query(query): Query<GalleryListQuery>,
) -> Result<Json<PagedResult<GalleryImage>>, ApiError> {
    let nursery = state.nursery_service.get_by_location(&location).await?;

    Ok(Json(
        state
            .gallery_service
            .list_public(nursery.id, query.category_id, query.featured, &query.params())
            .await?,
    ))
}

/// GET /api/admin/nurseries/{nursery_id}/gallery
async fn list_gallery(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(nursery_id): Path<i64>,
    Query(query): Query<GalleryListQuery>,
) -> Result<Json<PagedResult<GalleryImage>>, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    Ok(Json(
        state
            .gallery_service
            .list_admin(
                nursery_id,
                query.status,
                query.category_id,
                query.search.clone(),
                &query.params(),
            )
            .await?,
    ))
}

/// GET /api/admin/nurseries/{nursery_id}/gallery/{id}
async fn get_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((nursery_id, id)): Path<(i64, i64)>,
) -> Result<Json<GalleryImage>, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    Ok(Json(state.gallery_service.get_image(nursery_id, id).await?))
}

/// POST /api/admin/nurseries/{nursery_id}/gallery
async fn create_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(nursery_id): Path<i64>,
    Json(input): Json<CreateGalleryImageInput>,
) -> Result<impl IntoResponse, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    let image = state
        .gallery_service
        .create_image(nursery_id, Some(user.0.id), input)
        .await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "gallery.create", "gallery_image", image.id)
                .in_nursery(Some(nursery_id))
                .with_detail(image.title.clone().unwrap_or_default()),
        )
        .await;

    Ok((StatusCode::CREATED, Json(image)))
}

/// PUT /api/admin/nurseries/{nursery_id}/gallery/{id}
async fn update_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((nursery_id, id)): Path<(i64, i64)>,
    Json(input): Json<UpdateGalleryImageInput>,
) -> Result<Json<GalleryImage>, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    let image = state
        .gallery_service
        .update_image(nursery_id, id, Some(user.0.id), input)
        .await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "gallery.update", "gallery_image", id)
                .in_nursery(Some(nursery_id)),
        )
        .await;

    Ok(Json(image))
}

/// DELETE /api/admin/nurseries/{nursery_id}/gallery/{id}
async fn delete_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((nursery_id, id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    state.gallery_service.delete_image(nursery_id, id).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "gallery.delete", "gallery_image", id)
                .in_nursery(Some(nursery_id)),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/nurseries/{nursery_id}/gallery/categories
async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(nursery_id): Path<i64>,
) -> Result<Json<Vec<GalleryCategory>>, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    Ok(Json(state.gallery_service.list_categories(nursery_id).await?))
}

/// POST /api/admin/nurseries/{nursery_id}/gallery/categories
async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(nursery_id): Path<i64>,
    Json(input): Json<CreateGalleryCategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    let category = state.gallery_service.create_category(nursery_id, input).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "gallery.category.create", "gallery_category", category.id)
                .in_nursery(Some(nursery_id))
                .with_detail(category.name.clone()),
        )
        .await;

    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE /api/admin/nurseries/{nursery_id}/gallery/categories/{id}
async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((nursery_id, id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    check_nursery_access(&user.0, nursery_id)?;

    state.gallery_service.delete_category(nursery_id, id).await?;

    state
        .activity_service
        .record(
            NewActivityLog::new(user.0.id, "gallery.category.delete", "gallery_category", id)
                .in_nursery(Some(nursery_id)),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
