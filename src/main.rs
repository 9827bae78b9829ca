//! Seedling - a multi-tenant CMS for a chain of childcare nurseries

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seedling::{
    api::{self, AppState},
    config::{Config, StorageDriver},
    db::{self, repositories::Repositories},
    models::{CreateUserInput, ListParams, UserRole},
    services::{
        ActivityService, ContactService, EventService, GalleryService, NewsletterService,
        NurseryService, UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seedling=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Seedling CMS...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize storage
    let repos = match config.database.driver {
        StorageDriver::Sqlite => {
            let pool = db::create_pool(&config.database).await?;
            tracing::info!("Database connected: {}", config.database.url);

            let applied = db::migrations::run_migrations(&pool).await?;
            tracing::info!("Database migrations completed ({} applied)", applied);

            Repositories::sqlite(pool)
        }
        StorageDriver::Memory => {
            tracing::warn!("Using in-memory storage; all data is lost on shutdown");
            Repositories::memory()
        }
    };

    // Initialize services
    let user_service = Arc::new(UserService::with_session_expiration(
        repos.users.clone(),
        repos.sessions.clone(),
        config.session.expiration_days,
    ));
    let nursery_service = Arc::new(NurseryService::new(repos.nurseries.clone()));
    let event_service = Arc::new(EventService::new(
        repos.events.clone(),
        repos.nurseries.clone(),
    ));
    let newsletter_service = Arc::new(NewsletterService::new(
        repos.newsletters.clone(),
        repos.nurseries.clone(),
    ));
    let gallery_service = Arc::new(GalleryService::new(
        repos.gallery_images.clone(),
        repos.gallery_categories.clone(),
        repos.nurseries.clone(),
    ));
    let activity_service = Arc::new(ActivityService::new(repos.activity.clone()));
    let contact_service = Arc::new(ContactService::new(
        repos.contact.clone(),
        repos.nurseries.clone(),
    ));

    // Seed the initial super admin when the user table is empty
    if let Some(bootstrap) = &config.bootstrap {
        let existing = user_service.list_users(&ListParams::new(1, 1)).await?;
        if existing.total == 0 {
            user_service
                .create_user(CreateUserInput {
                    username: bootstrap.admin_username.clone(),
                    email: bootstrap.admin_email.clone(),
                    password: bootstrap.admin_password.clone(),
                    role: UserRole::SuperAdmin,
                    nursery_id: None,
                })
                .await?;
            tracing::info!(
                "Bootstrap super admin '{}' created",
                bootstrap.admin_username
            );
        }
    }

    // Build application state
    let state = AppState {
        user_service: user_service.clone(),
        nursery_service,
        event_service,
        newsletter_service,
        gallery_service,
        activity_service,
        contact_service,
        upload_config: Arc::new(config.upload.clone()),
    };

    // Expired session sweep (runs hourly)
    {
        let user_service = user_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match user_service.cleanup_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Removed {} expired sessions", n),
                    Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                }
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
