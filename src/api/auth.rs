//! Authentication API endpoints
//!
//! - POST /api/admin/login - Staff login
//! - POST /api/admin/logout - Destroy the current session
//! - GET  /api/admin/me - Current user
//! - PUT  /api/admin/password - Change own password

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{
    extract_session_token, ApiError, AppState, AuthenticatedUser,
};
use crate::models::User;

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for changing the own password
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// User info returned by the API (never includes the password hash)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub nursery_id: Option<i64>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role.to_string(),
            nursery_id: user.nursery_id,
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Build protected auth routes (require auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/password", put(change_password))
}

/// POST /api/admin/login
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.user_service.login(&body.username, &body.password).await?;

    // Session lifetime matches the server-side expiry
    let max_age = (result.session.expires_at - result.session.created_at).num_seconds();
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        result.session.id, max_age
    );

    let response = AuthResponse {
        token: result.session.id.clone(),
        user: result.user.into(),
    };

    let mut http_response = (StatusCode::OK, Json(response)).into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        http_response.headers_mut().insert(header::SET_COOKIE, value);
    }

    Ok(http_response)
}

/// POST /api/admin/logout
async fn logout(
    State(state): State<AppState>,
    request: Request,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = extract_session_token(&request) {
        state.user_service.logout(&token).await?;
    }

    let clear_cookie = "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";
    let mut http_response =
        (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response();
    if let Ok(value) = HeaderValue::from_str(clear_cookie) {
        http_response.headers_mut().insert(header::SET_COOKIE, value);
    }

    Ok(http_response)
}

/// GET /api/admin/me
async fn me(
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(user.0.into()))
}

/// PUT /api/admin/password
async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .user_service
        .change_password(user.0.id, &body.current_password, &body.new_password)
        .await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}
