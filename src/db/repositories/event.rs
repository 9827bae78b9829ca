//! Event repository
//!
//! Database operations for nursery events. Events always belong to exactly
//! one nursery and are listed in chronological order of their start time.

use crate::models::{Event, ListParams, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Event repository trait
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Create a new event
    async fn create(&self, event: &Event) -> Result<Event>;

    /// Get event by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Event>>;

    /// List events for a nursery, ordered by start time ascending
    async fn list_by_nursery(
        &self,
        nursery_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Event>>;

    /// List events for a nursery starting at or after the given time
    async fn list_upcoming(&self, nursery_id: i64, after: DateTime<Utc>) -> Result<Vec<Event>>;

    /// Update an event
    async fn update(&self, event: &Event) -> Result<Event>;

    /// Delete an event
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based event repository implementation
pub struct SqlxEventRepository {
    pool: SqlitePool,
}

impl SqlxEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn EventRepository> {
        Arc::new(Self::new(pool))
    }
}

const EVENT_COLUMNS: &str = "id, nursery_id, title, description, starts_at, ends_at, location, created_by, created_at, updated_at";

#[async_trait]
impl EventRepository for SqlxEventRepository {
    async fn create(&self, event: &Event) -> Result<Event> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO events (nursery_id, title, description, starts_at, ends_at, location, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.nursery_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(&event.location)
        .bind(event.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create event")?;

        let id = result.last_insert_rowid();

        Ok(Event {
            id,
            created_at: now,
            updated_at: now,
            ..event.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get event by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_event(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_nursery(
        &self,
        nursery_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Event>> {
        let count_row = sqlx::query("SELECT COUNT(*) as count FROM events WHERE nursery_id = ?")
            .bind(nursery_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count events")?;
        let total: i64 = count_row.get("count");

        let rows = sqlx::query(&format!(
            "SELECT {} FROM events WHERE nursery_id = ? ORDER BY starts_at ASC LIMIT ? OFFSET ?",
            EVENT_COLUMNS
        ))
        .bind(nursery_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list events")?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row_to_event(&row)?);
        }

        Ok(PagedResult::new(events, total, params))
    }

    async fn list_upcoming(&self, nursery_id: i64, after: DateTime<Utc>) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM events WHERE nursery_id = ? AND starts_at >= ? ORDER BY starts_at ASC",
            EVENT_COLUMNS
        ))
        .bind(nursery_id)
        .bind(after)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list upcoming events")?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row_to_event(&row)?);
        }

        Ok(events)
    }

    async fn update(&self, event: &Event) -> Result<Event> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE events
            SET title = ?, description = ?, starts_at = ?, ends_at = ?, location = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(&event.location)
        .bind(now)
        .bind(event.id)
        .execute(&self.pool)
        .await
        .context("Failed to update event")?;

        self.get_by_id(event.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Event not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete event")?;

        Ok(())
    }
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<Event> {
    Ok(Event {
        id: row.get("id"),
        nursery_id: row.get("nursery_id"),
        title: row.get("title"),
        description: row.get("description"),
        starts_at: row.get("starts_at"),
        ends_at: row.get("ends_at"),
        location: row.get("location"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::nursery::{NurseryRepository, SqlxNurseryRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateEventInput, CreateNurseryInput, Nursery};
    use chrono::Duration;

    async fn setup() -> (SqlxEventRepository, SqlxNurseryRepository, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let nurseries = SqlxNurseryRepository::new(pool.clone());
        let nursery = nurseries
            .create(&Nursery::from_input(CreateNurseryInput {
                name: "Events Nursery".to_string(),
                location: "events".to_string(),
                address: "1 High Street".to_string(),
                phone: None,
                email: None,
                opening_hours: None,
                hero_image: None,
                description: None,
            }))
            .await
            .expect("Failed to create nursery");

        (SqlxEventRepository::new(pool), nurseries, nursery.id)
    }

    fn event_input(title: &str, starts_in_hours: i64) -> CreateEventInput {
        CreateEventInput {
            title: title.to_string(),
            description: None,
            starts_at: Utc::now() + Duration::hours(starts_in_hours),
            ends_at: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_create_event() {
        let (repo, _nurseries, nursery_id) = setup().await;

        let created = repo
            .create(&Event::from_input(nursery_id, None, event_input("Sports Day", 48)))
            .await
            .expect("Failed to create event");

        assert!(created.id > 0);
        assert_eq!(created.nursery_id, nursery_id);
        assert_eq!(created.title, "Sports Day");
    }

    #[tokio::test]
    async fn test_list_by_nursery_ordered_by_start() {
        let (repo, _nurseries, nursery_id) = setup().await;
        repo.create(&Event::from_input(nursery_id, None, event_input("Later", 72)))
            .await
            .unwrap();
        repo.create(&Event::from_input(nursery_id, None, event_input("Sooner", 24)))
            .await
            .unwrap();

        let page = repo
            .list_by_nursery(nursery_id, &ListParams::default())
            .await
            .expect("Failed to list events");

        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].title, "Sooner");
        assert_eq!(page.items[1].title, "Later");
    }

    #[tokio::test]
    async fn test_list_upcoming_skips_past_events() {
        let (repo, _nurseries, nursery_id) = setup().await;
        repo.create(&Event::from_input(nursery_id, None, event_input("Past", -24)))
            .await
            .unwrap();
        repo.create(&Event::from_input(nursery_id, None, event_input("Future", 24)))
            .await
            .unwrap();

        let upcoming = repo
            .list_upcoming(nursery_id, Utc::now())
            .await
            .expect("Failed to list upcoming events");

        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].title, "Future");
    }

    #[tokio::test]
    async fn test_update_event() {
        let (repo, _nurseries, nursery_id) = setup().await;
        let mut created = repo
            .create(&Event::from_input(nursery_id, None, event_input("Open Day", 48)))
            .await
            .expect("Failed to create event");

        created.title = "Open Morning".to_string();
        created.location = Some("Main hall".to_string());

        let updated = repo.update(&created).await.expect("Failed to update event");

        assert_eq!(updated.title, "Open Morning");
        assert_eq!(updated.location, Some("Main hall".to_string()));
    }

    #[tokio::test]
    async fn test_delete_event() {
        let (repo, _nurseries, nursery_id) = setup().await;
        let created = repo
            .create(&Event::from_input(nursery_id, None, event_input("Gone", 48)))
            .await
            .expect("Failed to create event");

        repo.delete(created.id).await.expect("Failed to delete event");

        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_nursery_cascades_to_events() {
        let (repo, nurseries, nursery_id) = setup().await;
        let created = repo
            .create(&Event::from_input(nursery_id, None, event_input("Orphaned", 48)))
            .await
            .expect("Failed to create event");

        nurseries
            .delete(nursery_id)
            .await
            .expect("Failed to delete nursery");

        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }
}
