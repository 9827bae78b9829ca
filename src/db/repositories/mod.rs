//! Repository layer
//!
//! Each entity gets a trait describing its data access and two
//! implementations: a SQLx-backed one over SQLite and the shared
//! `MemoryStore`. Services depend only on the traits, so the storage
//! backend is chosen once at startup.

pub mod activity;
pub mod contact;
pub mod event;
pub mod gallery;
pub mod memory;
pub mod newsletter;
pub mod nursery;
pub mod session;
pub mod user;

pub use activity::{ActivityLogRepository, SqlxActivityLogRepository};
pub use contact::{ContactSubmissionRepository, SqlxContactSubmissionRepository};
pub use event::{EventRepository, SqlxEventRepository};
pub use gallery::{
    GalleryCategoryRepository, GalleryImageRepository, SqlxGalleryCategoryRepository,
    SqlxGalleryImageRepository,
};
pub use memory::MemoryStore;
pub use newsletter::{NewsletterRepository, SqlxNewsletterRepository};
pub use nursery::{NurseryRepository, SqlxNurseryRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};

use sqlx::SqlitePool;
use std::sync::Arc;

/// Bundle of every repository, injected into the service layer
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub nurseries: Arc<dyn NurseryRepository>,
    pub events: Arc<dyn EventRepository>,
    pub newsletters: Arc<dyn NewsletterRepository>,
    pub gallery_images: Arc<dyn GalleryImageRepository>,
    pub gallery_categories: Arc<dyn GalleryCategoryRepository>,
    pub activity: Arc<dyn ActivityLogRepository>,
    pub contact: Arc<dyn ContactSubmissionRepository>,
}

impl Repositories {
    /// Wire every repository to a SQLite pool
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            users: SqlxUserRepository::boxed(pool.clone()),
            sessions: SqlxSessionRepository::boxed(pool.clone()),
            nurseries: SqlxNurseryRepository::boxed(pool.clone()),
            events: SqlxEventRepository::boxed(pool.clone()),
            newsletters: SqlxNewsletterRepository::boxed(pool.clone()),
            gallery_images: SqlxGalleryImageRepository::boxed(pool.clone()),
            gallery_categories: SqlxGalleryCategoryRepository::boxed(pool.clone()),
            activity: SqlxActivityLogRepository::boxed(pool.clone()),
            contact: SqlxContactSubmissionRepository::boxed(pool),
        }
    }

    /// Wire every repository to one shared in-memory store
    pub fn memory() -> Self {
        let store = MemoryStore::shared();
        Self {
            users: store.clone(),
            sessions: store.clone(),
            nurseries: store.clone(),
            events: store.clone(),
            newsletters: store.clone(),
            gallery_images: store.clone(),
            gallery_categories: store.clone(),
            activity: store.clone(),
            contact: store,
        }
    }
}
