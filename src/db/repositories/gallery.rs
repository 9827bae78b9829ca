//! Gallery repositories
//!
//! Database operations for gallery images and their categories. Images are
//! listed by explicit sort order first, then newest first. Deleting a
//! category detaches its images rather than deleting them.

use crate::models::{
    GalleryCategory, GalleryFilter, GalleryImage, ImageStatus, ListParams, PagedResult,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Gallery image repository trait
#[async_trait]
pub trait GalleryImageRepository: Send + Sync {
    /// Create a new gallery image
    async fn create(&self, image: &GalleryImage) -> Result<GalleryImage>;

    /// Get image by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<GalleryImage>>;

    /// List images matching a filter, by sort order then newest first
    async fn list(
        &self,
        filter: &GalleryFilter,
        params: &ListParams,
    ) -> Result<PagedResult<GalleryImage>>;

    /// Update an image
    async fn update(&self, image: &GalleryImage) -> Result<GalleryImage>;

    /// Delete an image
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Gallery category repository trait
#[async_trait]
pub trait GalleryCategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: &GalleryCategory) -> Result<GalleryCategory>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<GalleryCategory>>;

    /// List a nursery's categories, ordered by name
    async fn list_by_nursery(&self, nursery_id: i64) -> Result<Vec<GalleryCategory>>;

    /// Delete a category; its images keep their rows with category cleared
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based gallery image repository implementation
pub struct SqlxGalleryImageRepository {
    pool: SqlitePool,
}

impl SqlxGalleryImageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn GalleryImageRepository> {
        Arc::new(Self::new(pool))
    }
}

const IMAGE_COLUMNS: &str = "id, nursery_id, category_id, title, image_url, status, featured, sort_order, uploaded_by, approved_by, created_at, updated_at";

/// Build the WHERE clause and bind values for a gallery filter.
///
/// Values bind as strings; SQLite's column affinity converts the numeric
/// ones back on comparison.
fn filter_clauses(filter: &GalleryFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();

    if let Some(nursery_id) = filter.nursery_id {
        clauses.push("nursery_id = ?".to_string());
        binds.push(nursery_id.to_string());
    }
    if let Some(category_id) = filter.category_id {
        clauses.push("category_id = ?".to_string());
        binds.push(category_id.to_string());
    }
    if let Some(status) = filter.status {
        clauses.push("status = ?".to_string());
        binds.push(status.to_string());
    }
    if let Some(featured) = filter.featured {
        clauses.push("featured = ?".to_string());
        binds.push(if featured { "1" } else { "0" }.to_string());
    }
    if let Some(ref search) = filter.search {
        clauses.push("LOWER(title) LIKE ?".to_string());
        binds.push(format!("%{}%", search.to_lowercase()));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    (where_clause, binds)
}

#[async_trait]
impl GalleryImageRepository for SqlxGalleryImageRepository {
    async fn create(&self, image: &GalleryImage) -> Result<GalleryImage> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO gallery_images (nursery_id, category_id, title, image_url, status, featured, sort_order, uploaded_by, approved_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(image.nursery_id)
        .bind(image.category_id)
        .bind(&image.title)
        .bind(&image.image_url)
        .bind(image.status.to_string())
        .bind(image.featured)
        .bind(image.sort_order)
        .bind(image.uploaded_by)
        .bind(image.approved_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create gallery image")?;

        let id = result.last_insert_rowid();

        Ok(GalleryImage {
            id,
            created_at: now,
            updated_at: now,
            ..image.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<GalleryImage>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM gallery_images WHERE id = ?",
            IMAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get gallery image by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_image(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filter: &GalleryFilter,
        params: &ListParams,
    ) -> Result<PagedResult<GalleryImage>> {
        let (where_clause, binds) = filter_clauses(filter);

        let count_sql = format!(
            "SELECT COUNT(*) as count FROM gallery_images{}",
            where_clause
        );
        let mut count_query = sqlx::query(&count_sql);
        for bind in &binds {
            count_query = count_query.bind(bind);
        }
        let count_row = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count gallery images")?;
        let total: i64 = count_row.get("count");

        let list_sql = format!(
            "SELECT {} FROM gallery_images{} ORDER BY sort_order ASC, created_at DESC LIMIT ? OFFSET ?",
            IMAGE_COLUMNS, where_clause
        );
        let mut list_query = sqlx::query(&list_sql);
        for bind in &binds {
            list_query = list_query.bind(bind);
        }
        let rows = list_query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list gallery images")?;

        let mut images = Vec::new();
        for row in rows {
            images.push(row_to_image(&row)?);
        }

        Ok(PagedResult::new(images, total, params))
    }

    async fn update(&self, image: &GalleryImage) -> Result<GalleryImage> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE gallery_images
            SET category_id = ?, title = ?, image_url = ?, status = ?, featured = ?,
                sort_order = ?, approved_by = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(image.category_id)
        .bind(&image.title)
        .bind(&image.image_url)
        .bind(image.status.to_string())
        .bind(image.featured)
        .bind(image.sort_order)
        .bind(image.approved_by)
        .bind(now)
        .bind(image.id)
        .execute(&self.pool)
        .await
        .context("Failed to update gallery image")?;

        self.get_by_id(image.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Gallery image not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM gallery_images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete gallery image")?;

        Ok(())
    }
}

fn row_to_image(row: &sqlx::sqlite::SqliteRow) -> Result<GalleryImage> {
    let status_str: String = row.get("status");
    let status: ImageStatus = status_str
        .parse()
        .context("Invalid image status in database")?;

    Ok(GalleryImage {
        id: row.get("id"),
        nursery_id: row.get("nursery_id"),
        category_id: row.get("category_id"),
        title: row.get("title"),
        image_url: row.get("image_url"),
        status,
        featured: row.get("featured"),
        sort_order: row.get("sort_order"),
        uploaded_by: row.get("uploaded_by"),
        approved_by: row.get("approved_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// SQLx-based gallery category repository implementation
pub struct SqlxGalleryCategoryRepository {
    pool: SqlitePool,
}

impl SqlxGalleryCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn GalleryCategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl GalleryCategoryRepository for SqlxGalleryCategoryRepository {
    async fn create(&self, category: &GalleryCategory) -> Result<GalleryCategory> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO gallery_categories (nursery_id, name, description, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(category.nursery_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create gallery category")?;

        let id = result.last_insert_rowid();

        Ok(GalleryCategory {
            id,
            created_at: now,
            ..category.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<GalleryCategory>> {
        let row = sqlx::query(
            "SELECT id, nursery_id, name, description, created_at FROM gallery_categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get gallery category by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_category(&row))),
            None => Ok(None),
        }
    }

    async fn list_by_nursery(&self, nursery_id: i64) -> Result<Vec<GalleryCategory>> {
        let rows = sqlx::query(
            "SELECT id, nursery_id, name, description, created_at FROM gallery_categories WHERE nursery_id = ? ORDER BY name",
        )
        .bind(nursery_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list gallery categories")?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM gallery_categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete gallery category")?;

        Ok(())
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> GalleryCategory {
    GalleryCategory {
        id: row.get("id"),
        nursery_id: row.get("nursery_id"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}
