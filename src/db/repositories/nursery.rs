//! Nursery repository
//!
//! Database operations for nursery sites, the tenant-partitioning unit of
//! the CMS. Deleting a nursery cascades to its events, newsletters and
//! gallery content via foreign keys.

use crate::models::Nursery;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Nursery repository trait
#[async_trait]
pub trait NurseryRepository: Send + Sync {
    /// Create a new nursery
    async fn create(&self, nursery: &Nursery) -> Result<Nursery>;

    /// Get nursery by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Nursery>>;

    /// Get nursery by its location slug
    async fn get_by_location(&self, location: &str) -> Result<Option<Nursery>>;

    /// List all nurseries, ordered by name
    async fn list(&self) -> Result<Vec<Nursery>>;

    /// Update a nursery
    async fn update(&self, nursery: &Nursery) -> Result<Nursery>;

    /// Delete a nursery and all of its content
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a location slug is already taken
    async fn exists_by_location(&self, location: &str) -> Result<bool>;
}

/// SQLx-based nursery repository implementation
pub struct SqlxNurseryRepository {
    pool: SqlitePool,
}

impl SqlxNurseryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn NurseryRepository> {
        Arc::new(Self::new(pool))
    }
}

const NURSERY_COLUMNS: &str = "id, name, location, address, phone, email, opening_hours, hero_image, description, created_at, updated_at";

#[async_trait]
impl NurseryRepository for SqlxNurseryRepository {
    async fn create(&self, nursery: &Nursery) -> Result<Nursery> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO nurseries (name, location, address, phone, email, opening_hours, hero_image, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&nursery.name)
        .bind(&nursery.location)
        .bind(&nursery.address)
        .bind(&nursery.phone)
        .bind(&nursery.email)
        .bind(&nursery.opening_hours)
        .bind(&nursery.hero_image)
        .bind(&nursery.description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create nursery")?;

        let id = result.last_insert_rowid();

        Ok(Nursery {
            id,
            created_at: now,
            updated_at: now,
            ..nursery.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Nursery>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM nurseries WHERE id = ?",
            NURSERY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get nursery by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_nursery(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_location(&self, location: &str) -> Result<Option<Nursery>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM nurseries WHERE location = ?",
            NURSERY_COLUMNS
        ))
        .bind(location)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get nursery by location")?;

        match row {
            Some(row) => Ok(Some(row_to_nursery(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Nursery>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM nurseries ORDER BY name",
            NURSERY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list nurseries")?;

        let mut nurseries = Vec::new();
        for row in rows {
            nurseries.push(row_to_nursery(&row)?);
        }

        Ok(nurseries)
    }

    async fn update(&self, nursery: &Nursery) -> Result<Nursery> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE nurseries
            SET name = ?, location = ?, address = ?, phone = ?, email = ?,
                opening_hours = ?, hero_image = ?, description = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&nursery.name)
        .bind(&nursery.location)
        .bind(&nursery.address)
        .bind(&nursery.phone)
        .bind(&nursery.email)
        .bind(&nursery.opening_hours)
        .bind(&nursery.hero_image)
        .bind(&nursery.description)
        .bind(now)
        .bind(nursery.id)
        .execute(&self.pool)
        .await
        .context("Failed to update nursery")?;

        self.get_by_id(nursery.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Nursery not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM nurseries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete nursery")?;

        Ok(())
    }

    async fn exists_by_location(&self, location: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM nurseries WHERE location = ?")
            .bind(location)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check nursery location existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}

fn row_to_nursery(row: &sqlx::sqlite::SqliteRow) -> Result<Nursery> {
    Ok(Nursery {
        id: row.get("id"),
        name: row.get("name"),
        location: row.get("location"),
        address: row.get("address"),
        phone: row.get("phone"),
        email: row.get("email"),
        opening_hours: row.get("opening_hours"),
        hero_image: row.get("hero_image"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
