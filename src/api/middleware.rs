//! API middleware
//!
//! Authentication (session token validation), role authorization and the
//! per-nursery access check that keeps one nursery's staff out of
//! another nursery's content.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::UploadConfig;
use crate::models::{User, UserRole};
use crate::services::{
    ActivityService, ContactService, EventService, GalleryService, NewsletterService,
    NurseryService, ServiceError, UserService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub nursery_service: Arc<NurseryService>,
    pub event_service: Arc<EventService>,
    pub newsletter_service: Arc<NewsletterService>,
    pub gallery_service: Arc<GalleryService>,
    pub activity_service: Arc<ActivityService>,
    pub contact_service: Arc<ContactService>,
    pub upload_config: Arc<UploadConfig>,
}

/// Authenticated user extracted from the request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Authentication(msg) => ApiError::unauthorized(msg),
            ServiceError::Validation(msg) => ApiError::validation_error(msg),
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            ServiceError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Extract session token from Authorization header or session cookie
pub fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state
        .user_service
        .validate_session(&token)
        .await
        .map_err(|e| match e {
            ServiceError::Authentication(msg) => ApiError::unauthorized(msg),
            other => ApiError::from(other),
        })?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Admin authorization middleware (nursery admin or super admin)
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_admin() {
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}

/// Super admin authorization middleware
pub async fn require_super_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if user.0.role != UserRole::SuperAdmin {
        return Err(ApiError::forbidden("Super admin privileges required"));
    }

    Ok(next.run(request).await)
}

/// Check that a user may touch content belonging to `nursery_id`.
///
/// Super admins may touch anything; everyone else only their own
/// nursery.
pub fn check_nursery_access(user: &User, nursery_id: i64) -> Result<(), ApiError> {
    if user.can_access_nursery(nursery_id) {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "You do not have access to this nursery",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use proptest::prelude::*;

    fn user_with(role: UserRole, nursery_id: Option<i64>) -> User {
        User::new(
            "someone".to_string(),
            "someone@example.com".to_string(),
            "hash".to_string(),
            role,
            nursery_id,
        )
    }

    #[test]
    fn test_extract_token_from_bearer_header() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc123")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_session_token(&request), Some("abc123".to_string()));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let request = Request::builder()
            .header(header::COOKIE, "theme=dark; session=xyz789; lang=en")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_session_token(&request), Some("xyz789".to_string()));
    }

    #[test]
    fn test_extract_token_prefers_header_over_cookie() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer from-header")
            .header(header::COOKIE, "session=from-cookie")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            extract_session_token(&request),
            Some("from-header".to_string())
        );
    }

    #[test]
    fn test_extract_token_missing() {
        let request = Request::builder().body(Body::empty()).unwrap();

        assert_eq!(extract_session_token(&request), None);
    }

    #[test]
    fn test_super_admin_can_access_any_nursery() {
        let user = user_with(UserRole::SuperAdmin, None);

        assert!(check_nursery_access(&user, 1).is_ok());
        assert!(check_nursery_access(&user, 999).is_ok());
    }

    #[test]
    fn test_staff_limited_to_own_nursery() {
        let user = user_with(UserRole::Staff, Some(3));

        assert!(check_nursery_access(&user, 3).is_ok());
        assert!(check_nursery_access(&user, 4).is_err());
    }

    #[test]
    fn test_service_error_mapping() {
        let cases = [
            (
                ServiceError::Authentication("x".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ServiceError::Validation("x".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Forbidden("x".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (ServiceError::NotFound("Thing"), StatusCode::NOT_FOUND),
            (
                ServiceError::Conflict("x".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    proptest! {
        // Cross-nursery access is denied for every non-super role and
        // every pair of distinct nursery ids
        #[test]
        fn prop_cross_nursery_access_denied(
            own in 1i64..1000,
            other in 1i64..1000,
            is_admin in any::<bool>(),
        ) {
            prop_assume!(own != other);
            let role = if is_admin {
                UserRole::NurseryAdmin
            } else {
                UserRole::Staff
            };
            let user = user_with(role, Some(own));

            prop_assert!(check_nursery_access(&user, own).is_ok());
            prop_assert!(check_nursery_access(&user, other).is_err());
        }

        // Assigned-nursery access never depends on the role
        #[test]
        fn prop_super_admin_never_denied(nursery in 1i64..10_000) {
            let user = user_with(UserRole::SuperAdmin, None);
            prop_assert!(check_nursery_access(&user, nursery).is_ok());
        }
    }
}
