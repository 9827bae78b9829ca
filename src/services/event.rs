//! Event service
//!
//! Nursery events. Content is always created against an existing
//! nursery, and an event's end must not precede its start.

use crate::db::repositories::{EventRepository, NurseryRepository};
use crate::models::{CreateEventInput, Event, ListParams, PagedResult, UpdateEventInput};
use crate::services::ServiceError;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Event service
pub struct EventService {
    event_repo: Arc<dyn EventRepository>,
    nursery_repo: Arc<dyn NurseryRepository>,
}

impl EventService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        nursery_repo: Arc<dyn NurseryRepository>,
    ) -> Self {
        Self {
            event_repo,
            nursery_repo,
        }
    }

    /// Create an event for a nursery
    pub async fn create(
        &self,
        nursery_id: i64,
        created_by: Option<i64>,
        input: CreateEventInput,
    ) -> Result<Event, ServiceError> {
        self.require_nursery(nursery_id).await?;

        if input.title.trim().is_empty() {
            return Err(ServiceError::validation("Title is required"));
        }
        validate_times(input.starts_at, input.ends_at)?;

        let created = self
            .event_repo
            .create(&Event::from_input(nursery_id, created_by, input))
            .await
            .context("Failed to create event")?;

        Ok(created)
    }

    /// Get an event, scoped to a nursery.
    ///
    /// An id that exists under another nursery is treated as not found.
    pub async fn get(&self, nursery_id: i64, id: i64) -> Result<Event, ServiceError> {
        let event = self
            .event_repo
            .get_by_id(id)
            .await
            .context("Failed to get event")?
            .ok_or(ServiceError::NotFound("Event"))?;

        if event.nursery_id != nursery_id {
            return Err(ServiceError::NotFound("Event"));
        }

        Ok(event)
    }

    /// List a nursery's events in chronological order
    pub async fn list(
        &self,
        nursery_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Event>, ServiceError> {
        self.require_nursery(nursery_id).await?;

        Ok(self
            .event_repo
            .list_by_nursery(nursery_id, params)
            .await
            .context("Failed to list events")?)
    }

    /// List a nursery's events that have not started yet
    pub async fn list_upcoming(&self, nursery_id: i64) -> Result<Vec<Event>, ServiceError> {
        self.require_nursery(nursery_id).await?;

        Ok(self
            .event_repo
            .list_upcoming(nursery_id, Utc::now())
            .await
            .context("Failed to list upcoming events")?)
    }

    /// Update an event
    pub async fn update(
        &self,
        nursery_id: i64,
        id: i64,
        input: UpdateEventInput,
    ) -> Result<Event, ServiceError> {
        let mut event = self.get(nursery_id, id).await?;

        if let Some(ref title) = input.title {
            if title.trim().is_empty() {
                return Err(ServiceError::validation("Title is required"));
            }
        }

        event.apply_update(input);
        validate_times(event.starts_at, event.ends_at)?;

        let updated = self
            .event_repo
            .update(&event)
            .await
            .context("Failed to update event")?;

        Ok(updated)
    }

    /// Delete an event
    pub async fn delete(&self, nursery_id: i64, id: i64) -> Result<(), ServiceError> {
        self.get(nursery_id, id).await?;

        self.event_repo
            .delete(id)
            .await
            .context("Failed to delete event")?;

        Ok(())
    }

    async fn require_nursery(&self, nursery_id: i64) -> Result<(), ServiceError> {
        self.nursery_repo
            .get_by_id(nursery_id)
            .await
            .context("Failed to check nursery")?
            .ok_or(ServiceError::NotFound("Nursery"))?;
        Ok(())
    }
}

fn validate_times(
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<(), ServiceError> {
    if let Some(ends_at) = ends_at {
        if ends_at < starts_at {
            return Err(ServiceError::validation("Event cannot end before it starts"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{MemoryStore, NurseryRepository};
    use crate::models::{CreateNurseryInput, Nursery};
    use chrono::Duration;

    async fn setup() -> (EventService, i64) {
        let store = MemoryStore::shared();
        let nursery = NurseryRepository::create(
            store.as_ref(),
            &Nursery::from_input(CreateNurseryInput {
                name: "Event Nursery".to_string(),
                location: "events".to_string(),
                address: "1 High Street".to_string(),
                phone: None,
                email: None,
                opening_hours: None,
                hero_image: None,
                description: None,
            }),
        )
        .await
        .expect("Failed to create nursery");

        (EventService::new(store.clone(), store), nursery.id)
    }

    fn input(title: &str, hours: i64) -> CreateEventInput {
        CreateEventInput {
            title: title.to_string(),
            description: None,
            starts_at: Utc::now() + Duration::hours(hours),
            ends_at: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_existing_nursery() {
        let (svc, _) = setup().await;

        let result = svc.create(999, None, input("Orphan", 24)).await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_end_before_start() {
        let (svc, nursery_id) = setup().await;
        let mut bad = input("Backwards", 24);
        bad.ends_at = Some(bad.starts_at - Duration::hours(1));

        let result = svc.create(nursery_id, None, bad).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let (svc, nursery_id) = setup().await;

        let result = svc.create(nursery_id, None, input("   ", 24)).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_is_scoped_to_nursery() {
        let (svc, nursery_id) = setup().await;
        let event = svc
            .create(nursery_id, None, input("Scoped", 24))
            .await
            .unwrap();

        assert!(svc.get(nursery_id, event.id).await.is_ok());
        assert!(matches!(
            svc.get(nursery_id + 1, event.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_validates_resulting_times() {
        let (svc, nursery_id) = setup().await;
        let event = svc
            .create(nursery_id, None, input("Shifting", 24))
            .await
            .unwrap();

        let result = svc
            .update(
                nursery_id,
                event.id,
                UpdateEventInput {
                    ends_at: Some(Some(event.starts_at - Duration::hours(2))),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_round_trip_create_then_list() {
        let (svc, nursery_id) = setup().await;
        let created = svc
            .create(nursery_id, None, input("Visible", 24))
            .await
            .unwrap();

        let page = svc
            .list(nursery_id, &ListParams::default())
            .await
            .expect("Failed to list events");

        assert!(page.items.iter().any(|e| e.id == created.id));
    }

    #[tokio::test]
    async fn test_delete_event() {
        let (svc, nursery_id) = setup().await;
        let created = svc
            .create(nursery_id, None, input("Doomed", 24))
            .await
            .unwrap();

        svc.delete(nursery_id, created.id)
            .await
            .expect("Failed to delete event");

        assert!(matches!(
            svc.get(nursery_id, created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
