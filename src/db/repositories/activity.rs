//! Activity log repository
//!
//! Append-only record of admin actions. Entries are never updated or
//! deleted through the API; listings are newest first and optionally
//! scoped to one nursery.

use crate::models::{ActivityLog, ListParams, NewActivityLog, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Activity log repository trait
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Append an entry to the log
    async fn create(&self, entry: &NewActivityLog) -> Result<ActivityLog>;

    /// List entries, newest first. `nursery_id = None` lists all entries.
    async fn list(
        &self,
        nursery_id: Option<i64>,
        params: &ListParams,
    ) -> Result<PagedResult<ActivityLog>>;
}

/// SQLx-based activity log repository implementation
pub struct SqlxActivityLogRepository {
    pool: SqlitePool,
}

impl SqlxActivityLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ActivityLogRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ActivityLogRepository for SqlxActivityLogRepository {
    async fn create(&self, entry: &NewActivityLog) -> Result<ActivityLog> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO activity_logs (user_id, action, entity_type, entity_id, nursery_id, detail, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(entry.nursery_id)
        .bind(&entry.detail)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to record activity")?;

        Ok(ActivityLog {
            id: result.last_insert_rowid(),
            user_id: entry.user_id,
            action: entry.action.clone(),
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id,
            nursery_id: entry.nursery_id,
            detail: entry.detail.clone(),
            created_at: now,
        })
    }

    async fn list(
        &self,
        nursery_id: Option<i64>,
        params: &ListParams,
    ) -> Result<PagedResult<ActivityLog>> {
        let (count_sql, list_sql) = match nursery_id {
            Some(_) => (
                "SELECT COUNT(*) as count FROM activity_logs WHERE nursery_id = ?",
                "SELECT id, user_id, action, entity_type, entity_id, nursery_id, detail, created_at \
                 FROM activity_logs WHERE nursery_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            ),
            None => (
                "SELECT COUNT(*) as count FROM activity_logs",
                "SELECT id, user_id, action, entity_type, entity_id, nursery_id, detail, created_at \
                 FROM activity_logs ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            ),
        };

        let mut count_query = sqlx::query(count_sql);
        if let Some(id) = nursery_id {
            count_query = count_query.bind(id);
        }
        let count_row = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count activity")?;
        let total: i64 = count_row.get("count");

        let mut list_query = sqlx::query(list_sql);
        if let Some(id) = nursery_id {
            list_query = list_query.bind(id);
        }
        let rows = list_query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list activity")?;

        let entries = rows
            .iter()
            .map(|row| ActivityLog {
                id: row.get("id"),
                user_id: row.get("user_id"),
                action: row.get("action"),
                entity_type: row.get("entity_type"),
                entity_id: row.get("entity_id"),
                nursery_id: row.get("nursery_id"),
                detail: row.get("detail"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(PagedResult::new(entries, total, params))
    }
}
