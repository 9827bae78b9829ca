//! Activity log endpoints
//!
//! Super admins may inspect any nursery (or the whole chain); everyone
//! else is pinned to their own nursery regardless of what they ask for.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{ActivityLog, ListParams, PagedResult, UserRole};

#[derive(Debug, Deserialize)]
pub struct ActivityListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub nursery_id: Option<i64>,
}

/// Build the activity route at /api/admin/activity
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_activity))
}

/// GET /api/admin/activity
async fn list_activity(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ActivityListQuery>,
) -> Result<Json<PagedResult<ActivityLog>>, ApiError> {
    let params = ListParams::new(query.page.unwrap_or(1), query.per_page.unwrap_or(50));

    let nursery_id = match user.0.role {
        UserRole::SuperAdmin => query.nursery_id,
        _ => user.0.nursery_id,
    };

    Ok(Json(state.activity_service.list(nursery_id, &params).await?))
}
