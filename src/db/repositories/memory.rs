//! In-memory store
//!
//! A single `MemoryStore` implements every repository trait over maps
//! guarded by one RwLock, mirroring the relational backend's semantics:
//! cascade deletes, SET NULL references, uniqueness constraints and the
//! same listing orders. Used for tests and for running the server without
//! a database file.

use crate::models::{
    ActivityLog, ContactSubmission, Event, GalleryCategory, GalleryFilter, GalleryImage,
    ListParams, NewActivityLog, Newsletter, NewsletterFilter, Nursery, PagedResult, Session, User,
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::activity::ActivityLogRepository;
use super::contact::ContactSubmissionRepository;
use super::event::EventRepository;
use super::gallery::{GalleryCategoryRepository, GalleryImageRepository};
use super::newsletter::NewsletterRepository;
use super::nursery::NurseryRepository;
use super::session::SessionRepository;
use super::user::UserRepository;

#[derive(Default)]
struct Inner {
    users: HashMap<i64, User>,
    sessions: HashMap<String, Session>,
    nurseries: HashMap<i64, Nursery>,
    events: HashMap<i64, Event>,
    newsletters: HashMap<i64, Newsletter>,
    gallery_images: HashMap<i64, GalleryImage>,
    gallery_categories: HashMap<i64, GalleryCategory>,
    activity: Vec<ActivityLog>,
    contact: HashMap<i64, ContactSubmission>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Map-backed store implementing all repository traits
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle suitable for cloning into each repository slot
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

fn paginate<T: Clone>(items: &[T], params: &ListParams) -> PagedResult<T> {
    let total = items.len() as i64;
    let page: Vec<T> = items
        .iter()
        .skip(params.offset() as usize)
        .take(params.limit() as usize)
        .cloned()
        .collect();
    PagedResult::new(page, total, params)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &User) -> Result<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == user.username) {
            bail!("username already exists: {}", user.username);
        }
        if inner.users.values().any(|u| u.email == user.email) {
            bail!("email already exists: {}", user.email);
        }

        let id = inner.next_id();
        let now = Utc::now();
        let stored = User {
            id,
            created_at: now,
            updated_at: now,
            ..user.clone()
        };
        inner.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self, params: &ListParams) -> Result<PagedResult<User>> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(paginate(&users, params))
    }

    async fn list_by_nursery(&self, nursery_id: i64) -> Result<Vec<User>> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|u| u.nursery_id == Some(nursery_id))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update(&self, user: &User) -> Result<User> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user.id) {
            bail!("user not found: {}", user.id);
        }
        let stored = User {
            updated_at: Utc::now(),
            ..user.clone()
        };
        inner.users.insert(user.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.users.remove(&id);
        // Mirror the relational cascades and SET NULL references
        inner.sessions.retain(|_, s| s.user_id != id);
        for event in inner.events.values_mut() {
            if event.created_by == Some(id) {
                event.created_by = None;
            }
        }
        for image in inner.gallery_images.values_mut() {
            if image.uploaded_by == Some(id) {
                image.uploaded_by = None;
            }
            if image.approved_by == Some(id) {
                image.approved_by = None;
            }
        }
        for entry in inner.activity.iter_mut() {
            if entry.user_id == Some(id) {
                entry.user_id = None;
            }
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.inner.read().await.users.len() as i64)
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create(&self, session: &Session) -> Result<Session> {
        let mut inner = self.inner.write().await;
        inner.sessions.insert(session.id.clone(), session.clone());
        Ok(session.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.inner.read().await.sessions.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.write().await.sessions.remove(id);
        Ok(())
    }

    async fn delete_by_user(&self, user_id: i64) -> Result<()> {
        self.inner
            .write()
            .await
            .sessions
            .retain(|_, s| s.user_id != user_id);
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.sessions.len();
        inner.sessions.retain(|_, s| !s.is_expired());
        Ok((before - inner.sessions.len()) as u64)
    }
}

#[async_trait]
impl NurseryRepository for MemoryStore {
    async fn create(&self, nursery: &Nursery) -> Result<Nursery> {
        let mut inner = self.inner.write().await;
        if inner
            .nurseries
            .values()
            .any(|n| n.location == nursery.location)
        {
            bail!("location already exists: {}", nursery.location);
        }

        let id = inner.next_id();
        let now = Utc::now();
        let stored = Nursery {
            id,
            created_at: now,
            updated_at: now,
            ..nursery.clone()
        };
        inner.nurseries.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Nursery>> {
        Ok(self.inner.read().await.nurseries.get(&id).cloned())
    }

    async fn get_by_location(&self, location: &str) -> Result<Option<Nursery>> {
        Ok(self
            .inner
            .read()
            .await
            .nurseries
            .values()
            .find(|n| n.location == location)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Nursery>> {
        let inner = self.inner.read().await;
        let mut nurseries: Vec<Nursery> = inner.nurseries.values().cloned().collect();
        nurseries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(nurseries)
    }

    async fn update(&self, nursery: &Nursery) -> Result<Nursery> {
        let mut inner = self.inner.write().await;
        if !inner.nurseries.contains_key(&nursery.id) {
            bail!("nursery not found: {}", nursery.id);
        }
        if inner
            .nurseries
            .values()
            .any(|n| n.id != nursery.id && n.location == nursery.location)
        {
            bail!("location already exists: {}", nursery.location);
        }
        let stored = Nursery {
            updated_at: Utc::now(),
            ..nursery.clone()
        };
        inner.nurseries.insert(nursery.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.nurseries.remove(&id);
        // Cascade to nursery-owned content
        inner.events.retain(|_, e| e.nursery_id != id);
        inner
            .newsletters
            .retain(|_, n| n.nursery_id != Some(id));
        inner.gallery_images.retain(|_, i| i.nursery_id != id);
        inner.gallery_categories.retain(|_, c| c.nursery_id != id);
        // Detach references that survive the nursery
        for user in inner.users.values_mut() {
            if user.nursery_id == Some(id) {
                user.nursery_id = None;
            }
        }
        for submission in inner.contact.values_mut() {
            if submission.nursery_id == Some(id) {
                submission.nursery_id = None;
            }
        }
        Ok(())
    }

    async fn exists_by_location(&self, location: &str) -> Result<bool> {
        Ok(self
            .inner
            .read()
            .await
            .nurseries
            .values()
            .any(|n| n.location == location))
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn create(&self, event: &Event) -> Result<Event> {
        let mut inner = self.inner.write().await;
        if !inner.nurseries.contains_key(&event.nursery_id) {
            bail!("nursery not found: {}", event.nursery_id);
        }

        let id = inner.next_id();
        let now = Utc::now();
        let stored = Event {
            id,
            created_at: now,
            updated_at: now,
            ..event.clone()
        };
        inner.events.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.inner.read().await.events.get(&id).cloned())
    }

    async fn list_by_nursery(
        &self,
        nursery_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Event>> {
        let inner = self.inner.read().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|e| e.nursery_id == nursery_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.starts_at);
        Ok(paginate(&events, params))
    }

    async fn list_upcoming(&self, nursery_id: i64, after: DateTime<Utc>) -> Result<Vec<Event>> {
        let inner = self.inner.read().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|e| e.nursery_id == nursery_id && e.starts_at >= after)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.starts_at);
        Ok(events)
    }

    async fn update(&self, event: &Event) -> Result<Event> {
        let mut inner = self.inner.write().await;
        if !inner.events.contains_key(&event.id) {
            bail!("event not found: {}", event.id);
        }
        let stored = Event {
            updated_at: Utc::now(),
            ..event.clone()
        };
        inner.events.insert(event.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.inner.write().await.events.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl NewsletterRepository for MemoryStore {
    async fn create(&self, newsletter: &Newsletter) -> Result<Newsletter> {
        let mut inner = self.inner.write().await;
        if let Some(nursery_id) = newsletter.nursery_id {
            if !inner.nurseries.contains_key(&nursery_id) {
                bail!("nursery not found: {}", nursery_id);
            }
        }

        let id = inner.next_id();
        let now = Utc::now();
        let stored = Newsletter {
            id,
            created_at: now,
            updated_at: now,
            ..newsletter.clone()
        };
        inner.newsletters.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Newsletter>> {
        Ok(self.inner.read().await.newsletters.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &NewsletterFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Newsletter>> {
        let inner = self.inner.read().await;
        let mut newsletters: Vec<Newsletter> = inner
            .newsletters
            .values()
            .filter(|n| n.matches(filter))
            .cloned()
            .collect();
        newsletters.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(paginate(&newsletters, params))
    }

    async fn list_broadcasts(&self, params: &ListParams) -> Result<PagedResult<Newsletter>> {
        let inner = self.inner.read().await;
        let mut newsletters: Vec<Newsletter> = inner
            .newsletters
            .values()
            .filter(|n| n.nursery_id.is_none())
            .cloned()
            .collect();
        newsletters.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(paginate(&newsletters, params))
    }

    async fn update(&self, newsletter: &Newsletter) -> Result<Newsletter> {
        let mut inner = self.inner.write().await;
        if !inner.newsletters.contains_key(&newsletter.id) {
            bail!("newsletter not found: {}", newsletter.id);
        }
        let stored = Newsletter {
            updated_at: Utc::now(),
            ..newsletter.clone()
        };
        inner.newsletters.insert(newsletter.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.inner.write().await.newsletters.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl GalleryImageRepository for MemoryStore {
    async fn create(&self, image: &GalleryImage) -> Result<GalleryImage> {
        let mut inner = self.inner.write().await;
        if !inner.nurseries.contains_key(&image.nursery_id) {
            bail!("nursery not found: {}", image.nursery_id);
        }

        let id = inner.next_id();
        let now = Utc::now();
        let stored = GalleryImage {
            id,
            created_at: now,
            updated_at: now,
            ..image.clone()
        };
        inner.gallery_images.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<GalleryImage>> {
        Ok(self.inner.read().await.gallery_images.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &GalleryFilter,
        params: &ListParams,
    ) -> Result<PagedResult<GalleryImage>> {
        let inner = self.inner.read().await;
        let mut images: Vec<GalleryImage> = inner
            .gallery_images
            .values()
            .filter(|i| i.matches(filter))
            .cloned()
            .collect();
        images.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(paginate(&images, params))
    }

    async fn update(&self, image: &GalleryImage) -> Result<GalleryImage> {
        let mut inner = self.inner.write().await;
        if !inner.gallery_images.contains_key(&image.id) {
            bail!("gallery image not found: {}", image.id);
        }
        let stored = GalleryImage {
            updated_at: Utc::now(),
            ..image.clone()
        };
        inner.gallery_images.insert(image.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.inner.write().await.gallery_images.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl GalleryCategoryRepository for MemoryStore {
    async fn create(&self, category: &GalleryCategory) -> Result<GalleryCategory> {
        let mut inner = self.inner.write().await;
        if !inner.nurseries.contains_key(&category.nursery_id) {
            bail!("nursery not found: {}", category.nursery_id);
        }

        let id = inner.next_id();
        let stored = GalleryCategory {
            id,
            created_at: Utc::now(),
            ..category.clone()
        };
        inner.gallery_categories.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<GalleryCategory>> {
        Ok(self.inner.read().await.gallery_categories.get(&id).cloned())
    }

    async fn list_by_nursery(&self, nursery_id: i64) -> Result<Vec<GalleryCategory>> {
        let inner = self.inner.read().await;
        let mut categories: Vec<GalleryCategory> = inner
            .gallery_categories
            .values()
            .filter(|c| c.nursery_id == nursery_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.gallery_categories.remove(&id);
        // Images keep their rows with the category cleared
        for image in inner.gallery_images.values_mut() {
            if image.category_id == Some(id) {
                image.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityLogRepository for MemoryStore {
    async fn create(&self, entry: &NewActivityLog) -> Result<ActivityLog> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let stored = ActivityLog {
            id,
            user_id: entry.user_id,
            action: entry.action.clone(),
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id,
            nursery_id: entry.nursery_id,
            detail: entry.detail.clone(),
            created_at: Utc::now(),
        };
        inner.activity.push(stored.clone());
        Ok(stored)
    }

    async fn list(
        &self,
        nursery_id: Option<i64>,
        params: &ListParams,
    ) -> Result<PagedResult<ActivityLog>> {
        let inner = self.inner.read().await;
        let mut entries: Vec<ActivityLog> = inner
            .activity
            .iter()
            .filter(|e| nursery_id.is_none() || e.nursery_id == nursery_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(&entries, params))
    }
}

#[async_trait]
impl ContactSubmissionRepository for MemoryStore {
    async fn create(&self, submission: &ContactSubmission) -> Result<ContactSubmission> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let stored = ContactSubmission {
            id,
            created_at: Utc::now(),
            ..submission.clone()
        };
        inner.contact.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ContactSubmission>> {
        Ok(self.inner.read().await.contact.get(&id).cloned())
    }

    async fn list(&self, params: &ListParams) -> Result<PagedResult<ContactSubmission>> {
        let inner = self.inner.read().await;
        let mut submissions: Vec<ContactSubmission> = inner.contact.values().cloned().collect();
        submissions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(&submissions, params))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.inner.write().await.contact.remove(&id);
        Ok(())
    }
}
