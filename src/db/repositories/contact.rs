//! Contact submission repository
//!
//! Stores enquiries from the public contact form for the admin inbox.

use crate::models::{ContactSubmission, ListParams, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Contact submission repository trait
#[async_trait]
pub trait ContactSubmissionRepository: Send + Sync {
    /// Store a new submission
    async fn create(&self, submission: &ContactSubmission) -> Result<ContactSubmission>;

    /// Get submission by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<ContactSubmission>>;

    /// List submissions, newest first
    async fn list(&self, params: &ListParams) -> Result<PagedResult<ContactSubmission>>;

    /// Delete a submission
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based contact submission repository implementation
pub struct SqlxContactSubmissionRepository {
    pool: SqlitePool,
}

impl SqlxContactSubmissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ContactSubmissionRepository> {
        Arc::new(Self::new(pool))
    }
}

const CONTACT_COLUMNS: &str = "id, name, email, phone, message, nursery_id, created_at";

#[async_trait]
impl ContactSubmissionRepository for SqlxContactSubmissionRepository {
    async fn create(&self, submission: &ContactSubmission) -> Result<ContactSubmission> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO contact_submissions (name, email, phone, message, nursery_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.message)
        .bind(submission.nursery_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create contact submission")?;

        Ok(ContactSubmission {
            id: result.last_insert_rowid(),
            created_at: now,
            ..submission.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ContactSubmission>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM contact_submissions WHERE id = ?",
            CONTACT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get contact submission")?;

        match row {
            Some(row) => Ok(Some(row_to_submission(&row))),
            None => Ok(None),
        }
    }

    async fn list(&self, params: &ListParams) -> Result<PagedResult<ContactSubmission>> {
        let count_row = sqlx::query("SELECT COUNT(*) as count FROM contact_submissions")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count contact submissions")?;
        let total: i64 = count_row.get("count");

        let rows = sqlx::query(&format!(
            "SELECT {} FROM contact_submissions ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            CONTACT_COLUMNS
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list contact submissions")?;

        let submissions = rows.iter().map(row_to_submission).collect();

        Ok(PagedResult::new(submissions, total, params))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM contact_submissions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete contact submission")?;

        Ok(())
    }
}

fn row_to_submission(row: &sqlx::sqlite::SqliteRow) -> ContactSubmission {
    ContactSubmission {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        message: row.get("message"),
        nursery_id: row.get("nursery_id"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreateContactInput;

    async fn setup() -> SqlxContactSubmissionRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxContactSubmissionRepository::new(pool)
    }

    fn submission(name: &str) -> ContactSubmission {
        ContactSubmission::from_input(CreateContactInput {
            name: name.to_string(),
            email: format!("{}@example.com", name),
            phone: None,
            message: "Do you have places for September?".to_string(),
            nursery_id: None,
        })
    }

    #[tokio::test]
    async fn test_create_and_get_submission() {
        let repo = setup().await;

        let created = repo
            .create(&submission("parent"))
            .await
            .expect("Failed to create submission");

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get submission")
            .expect("Submission not found");

        assert_eq!(found.name, "parent");
        assert_eq!(found.email, "parent@example.com");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = setup().await;
        repo.create(&submission("first")).await.unwrap();
        repo.create(&submission("second")).await.unwrap();

        let page = repo
            .list(&ListParams::default())
            .await
            .expect("Failed to list submissions");

        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].name, "second");
        assert_eq!(page.items[1].name, "first");
    }

    #[tokio::test]
    async fn test_delete_submission() {
        let repo = setup().await;
        let created = repo.create(&submission("gone")).await.unwrap();

        repo.delete(created.id).await.expect("Failed to delete submission");

        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }
}
