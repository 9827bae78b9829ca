//! Service layer
//!
//! Business logic on top of the repository traits. Services validate
//! input, enforce cross-entity rules (a nursery must exist before content
//! can be attached to it, location slugs are unique) and translate
//! storage failures into `ServiceError` values the API layer maps onto
//! HTTP statuses.

pub mod activity;
pub mod contact;
pub mod event;
pub mod gallery;
pub mod newsletter;
pub mod nursery;
pub mod password;
pub mod user;

pub use activity::ActivityService;
pub use contact::ContactService;
pub use event::EventService;
pub use gallery::GalleryService;
pub use newsletter::NewsletterService;
pub use nursery::NurseryService;
pub use user::{LoginResult, UserService};

/// Error type shared by all services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Authentication failed (invalid credentials or session)
    #[error("{0}")]
    Authentication(String),

    /// Input failed validation
    #[error("{0}")]
    Validation(String),

    /// Caller is authenticated but not allowed to touch the target
    #[error("{0}")]
    Forbidden(String),

    /// Requested entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness or state conflict
    #[error("{0}")]
    Conflict(String),

    /// Internal error (storage failure and the like)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
