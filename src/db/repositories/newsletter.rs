//! Newsletter repository
//!
//! Database operations for newsletters. A newsletter with a null nursery_id
//! is a broadcast visible on every nursery's site; listings optionally fold
//! broadcasts into a nursery's own newsletters.

use crate::models::{ListParams, Newsletter, NewsletterFilter, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Newsletter repository trait
#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    /// Create a new newsletter
    async fn create(&self, newsletter: &Newsletter) -> Result<Newsletter>;

    /// Get newsletter by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Newsletter>>;

    /// List newsletters matching a filter, newest published first
    async fn list(
        &self,
        filter: &NewsletterFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Newsletter>>;

    /// List broadcast newsletters (no nursery), newest published first
    async fn list_broadcasts(&self, params: &ListParams) -> Result<PagedResult<Newsletter>>;

    /// Update a newsletter
    async fn update(&self, newsletter: &Newsletter) -> Result<Newsletter>;

    /// Delete a newsletter
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based newsletter repository implementation
pub struct SqlxNewsletterRepository {
    pool: SqlitePool,
}

impl SqlxNewsletterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn NewsletterRepository> {
        Arc::new(Self::new(pool))
    }
}

const NEWSLETTER_COLUMNS: &str =
    "id, nursery_id, title, description, file_url, published_at, tag, created_at, updated_at";

/// Build the WHERE clause and bind values for a newsletter filter.
///
/// Values are returned as strings; numeric ids pass through SQLite's type
/// affinity unchanged.
fn filter_clauses(filter: &NewsletterFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();

    if let Some(nursery_id) = filter.nursery_id {
        if filter.include_broadcasts {
            clauses.push("(nursery_id = ? OR nursery_id IS NULL)".to_string());
        } else {
            clauses.push("nursery_id = ?".to_string());
        }
        binds.push(nursery_id.to_string());
    }
    if let Some(ref tag) = filter.tag {
        clauses.push("tag = ?".to_string());
        binds.push(tag.clone());
    }
    if let Some(ref search) = filter.search {
        clauses.push("(LOWER(title) LIKE ? OR LOWER(description) LIKE ?)".to_string());
        let pattern = format!("%{}%", search.to_lowercase());
        binds.push(pattern.clone());
        binds.push(pattern);
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    (where_clause, binds)
}

impl SqlxNewsletterRepository {
    async fn list_where(
        &self,
        where_clause: &str,
        binds: &[String],
        params: &ListParams,
    ) -> Result<PagedResult<Newsletter>> {
        let count_sql = format!("SELECT COUNT(*) as count FROM newsletters{}", where_clause);
        let mut count_query = sqlx::query(&count_sql);
        for bind in binds {
            count_query = count_query.bind(bind);
        }
        let count_row = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count newsletters")?;
        let total: i64 = count_row.get("count");

        let list_sql = format!(
            "SELECT {} FROM newsletters{} ORDER BY published_at DESC LIMIT ? OFFSET ?",
            NEWSLETTER_COLUMNS, where_clause
        );
        let mut list_query = sqlx::query(&list_sql);
        for bind in binds {
            list_query = list_query.bind(bind);
        }
        let rows = list_query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list newsletters")?;

        let mut newsletters = Vec::new();
        for row in rows {
            newsletters.push(row_to_newsletter(&row)?);
        }

        Ok(PagedResult::new(newsletters, total, params))
    }
}

#[async_trait]
impl NewsletterRepository for SqlxNewsletterRepository {
    async fn create(&self, newsletter: &Newsletter) -> Result<Newsletter> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO newsletters (nursery_id, title, description, file_url, published_at, tag, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(newsletter.nursery_id)
        .bind(&newsletter.title)
        .bind(&newsletter.description)
        .bind(&newsletter.file_url)
        .bind(newsletter.published_at)
        .bind(&newsletter.tag)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create newsletter")?;

        let id = result.last_insert_rowid();

        Ok(Newsletter {
            id,
            created_at: now,
            updated_at: now,
            ..newsletter.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Newsletter>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM newsletters WHERE id = ?",
            NEWSLETTER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get newsletter by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_newsletter(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filter: &NewsletterFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Newsletter>> {
        let (where_clause, binds) = filter_clauses(filter);
        self.list_where(&where_clause, &binds, params).await
    }

    async fn list_broadcasts(&self, params: &ListParams) -> Result<PagedResult<Newsletter>> {
        self.list_where(" WHERE nursery_id IS NULL", &[], params)
            .await
    }

    async fn update(&self, newsletter: &Newsletter) -> Result<Newsletter> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE newsletters
            SET title = ?, description = ?, file_url = ?, published_at = ?, tag = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&newsletter.title)
        .bind(&newsletter.description)
        .bind(&newsletter.file_url)
        .bind(newsletter.published_at)
        .bind(&newsletter.tag)
        .bind(now)
        .bind(newsletter.id)
        .execute(&self.pool)
        .await
        .context("Failed to update newsletter")?;

        self.get_by_id(newsletter.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Newsletter not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM newsletters WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete newsletter")?;

        Ok(())
    }
}

fn row_to_newsletter(row: &sqlx::sqlite::SqliteRow) -> Result<Newsletter> {
    Ok(Newsletter {
        id: row.get("id"),
        nursery_id: row.get("nursery_id"),
        title: row.get("title"),
        description: row.get("description"),
        file_url: row.get("file_url"),
        published_at: row.get("published_at"),
        tag: row.get("tag"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
