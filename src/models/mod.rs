//! Data models
//!
//! This module contains all data structures used throughout the Seedling CMS.
//! Models represent:
//! - Database entities (User, Session, Nursery, Event, Newsletter, GalleryImage, ...)
//! - Pagination and filter parameters shared across repositories

mod activity;
mod common;
mod contact;
mod event;
mod gallery;
mod newsletter;
mod nursery;
mod session;
mod user;

pub use activity::{ActivityLog, NewActivityLog};
pub use common::{ListParams, PagedResult};
pub use contact::{ContactSubmission, CreateContactInput};
pub use event::{CreateEventInput, Event, UpdateEventInput};
pub use gallery::{
    CreateGalleryCategoryInput, CreateGalleryImageInput, GalleryCategory, GalleryFilter,
    GalleryImage, ImageStatus, UpdateGalleryImageInput,
};
pub use newsletter::{CreateNewsletterInput, Newsletter, NewsletterFilter, UpdateNewsletterInput};
pub use nursery::{CreateNurseryInput, Nursery, UpdateNurseryInput};
pub use session::Session;
pub use user::{CreateUserInput, UpdateUserInput, User, UserRole};
