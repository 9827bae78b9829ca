//! API layer - HTTP handlers and routing
//!
//! Route map:
//! - /api/nurseries              public nursery directory and per-location content
//! - /api/contact                public contact form
//! - /api/admin/login            public
//! - /api/admin/*                authenticated; role layers tighten from there
//! - /uploads                    static file serving for uploaded assets

pub mod activity;
pub mod auth;
pub mod contact;
pub mod events;
pub mod gallery;
pub mod middleware;
pub mod newsletters;
pub mod nurseries;
pub mod upload;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{check_nursery_access, ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Super admin routes: nursery lifecycle, user accounts, broadcasts
    let super_admin_routes = Router::new()
        .nest("/admin/nurseries", nurseries::super_admin_router())
        .nest("/admin/users", users::router())
        .nest("/admin/newsletters", newsletters::broadcast_router())
        .route_layer(axum_middleware::from_fn(middleware::require_super_admin));

    // Admin routes: nursery detail and the contact inbox
    let admin_routes = Router::new()
        .nest("/admin/nurseries", nurseries::admin_router())
        .nest("/admin/contact", contact::admin_router())
        .nest("/admin/activity", activity::router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin));

    // Authenticated routes. Per-nursery content handlers enforce their
    // own nursery scoping, which is what lets staff accounts in.
    let protected_routes = Router::new()
        .nest("/admin", auth::protected_router())
        .nest("/admin/nurseries", events::admin_router())
        .nest("/admin/nurseries", newsletters::admin_router())
        .nest("/admin/nurseries", gallery::admin_router())
        .nest("/admin/upload", upload::router())
        .merge(admin_routes)
        .merge(super_admin_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/nurseries", nurseries::public_router())
        .nest("/nurseries", events::public_router())
        .nest("/nurseries", newsletters::public_router())
        .nest("/nurseries", gallery::public_router())
        .nest("/contact", contact::public_router())
        .nest("/admin", auth::public_router())
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    // CORS must allow credentials for cookie-based sessions
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    let uploads_dir = state.upload_config.path.clone();

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
