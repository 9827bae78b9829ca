//! Gallery service
//!
//! Gallery images and categories for a nursery. The public gallery only
//! ever sees published images; drafts and archived images are admin-only.
//! Publishing an image records who approved it.

use crate::db::repositories::{GalleryCategoryRepository, GalleryImageRepository, NurseryRepository};
use crate::models::{
    CreateGalleryCategoryInput, CreateGalleryImageInput, GalleryCategory, GalleryFilter,
    GalleryImage, ImageStatus, ListParams, PagedResult, UpdateGalleryImageInput,
};
use crate::services::ServiceError;
use anyhow::Context;
use std::sync::Arc;

/// Gallery service
pub struct GalleryService {
    image_repo: Arc<dyn GalleryImageRepository>,
    category_repo: Arc<dyn GalleryCategoryRepository>,
    nursery_repo: Arc<dyn NurseryRepository>,
}

impl GalleryService {
    pub fn new(
        image_repo: Arc<dyn GalleryImageRepository>,
        category_repo: Arc<dyn GalleryCategoryRepository>,
        nursery_repo: Arc<dyn NurseryRepository>,
    ) -> Self {
        Self {
            image_repo,
            category_repo,
            nursery_repo,
        }
    }

    /// Add an image to a nursery's gallery
    pub async fn create_image(
        &self,
        nursery_id: i64,
        uploaded_by: Option<i64>,
        input: CreateGalleryImageInput,
    ) -> Result<GalleryImage, ServiceError> {
        self.require_nursery(nursery_id).await?;

        if input.image_url.trim().is_empty() {
            return Err(ServiceError::validation("Image URL is required"));
        }
        if let Some(category_id) = input.category_id {
            self.require_category(nursery_id, category_id).await?;
        }

        let created = self
            .image_repo
            .create(&GalleryImage::from_input(nursery_id, uploaded_by, input))
            .await
            .context("Failed to create gallery image")?;

        Ok(created)
    }

    /// Get an image scoped to a nursery
    pub async fn get_image(&self, nursery_id: i64, id: i64) -> Result<GalleryImage, ServiceError> {
        let image = self
            .image_repo
            .get_by_id(id)
            .await
            .context("Failed to get gallery image")?
            .ok_or(ServiceError::NotFound("Image"))?;

        if image.nursery_id != nursery_id {
            return Err(ServiceError::NotFound("Image"));
        }

        Ok(image)
    }

    /// List a nursery's published images for the public gallery
    pub async fn list_public(
        &self,
        nursery_id: i64,
        category_id: Option<i64>,
        featured: Option<bool>,
        params: &ListParams,
    ) -> Result<PagedResult<GalleryImage>, ServiceError> {
        self.require_nursery(nursery_id).await?;

        let filter = GalleryFilter {
            nursery_id: Some(nursery_id),
            category_id,
            status: Some(ImageStatus::Published),
            featured,
            search: None,
        };

        Ok(self
            .image_repo
            .list(&filter, params)
            .await
            .context("Failed to list gallery images")?)
    }

    /// List a nursery's images for the admin view, any status
    pub async fn list_admin(
        &self,
        nursery_id: i64,
        status: Option<ImageStatus>,
        category_id: Option<i64>,
        search: Option<String>,
        params: &ListParams,
    ) -> Result<PagedResult<GalleryImage>, ServiceError> {
        self.require_nursery(nursery_id).await?;

        let filter = GalleryFilter {
            nursery_id: Some(nursery_id),
            category_id,
            status,
            featured: None,
            search,
        };

        Ok(self
            .image_repo
            .list(&filter, params)
            .await
            .context("Failed to list gallery images")?)
    }

    /// Update an image; publishing records the acting admin as approver
    pub async fn update_image(
        &self,
        nursery_id: i64,
        id: i64,
        actor_id: Option<i64>,
        input: UpdateGalleryImageInput,
    ) -> Result<GalleryImage, ServiceError> {
        let mut image = self.get_image(nursery_id, id).await?;

        if let Some(Some(category_id)) = input.category_id {
            self.require_category(nursery_id, category_id).await?;
        }

        image.apply_update(input, actor_id);

        let updated = self
            .image_repo
            .update(&image)
            .await
            .context("Failed to update gallery image")?;

        Ok(updated)
    }

    /// Delete an image
    pub async fn delete_image(&self, nursery_id: i64, id: i64) -> Result<(), ServiceError> {
        self.get_image(nursery_id, id).await?;

        self.image_repo
            .delete(id)
            .await
            .context("Failed to delete gallery image")?;

        Ok(())
    }

    /// Create a category within a nursery
    pub async fn create_category(
        &self,
        nursery_id: i64,
        input: CreateGalleryCategoryInput,
    ) -> Result<GalleryCategory, ServiceError> {
        self.require_nursery(nursery_id).await?;

        if input.name.trim().is_empty() {
            return Err(ServiceError::validation("Name is required"));
        }

        let existing = self
            .category_repo
            .list_by_nursery(nursery_id)
            .await
            .context("Failed to list categories")?;
        if existing.iter().any(|c| c.name == input.name) {
            return Err(ServiceError::conflict(format!(
                "Category '{}' already exists",
                input.name
            )));
        }

        let category = GalleryCategory {
            id: 0,
            nursery_id,
            name: input.name,
            description: input.description,
            created_at: chrono::Utc::now(),
        };

        let created = self
            .category_repo
            .create(&category)
            .await
            .context("Failed to create category")?;

        Ok(created)
    }

    /// List a nursery's categories
    pub async fn list_categories(
        &self,
        nursery_id: i64,
    ) -> Result<Vec<GalleryCategory>, ServiceError> {
        self.require_nursery(nursery_id).await?;

        Ok(self
            .category_repo
            .list_by_nursery(nursery_id)
            .await
            .context("Failed to list categories")?)
    }

    /// Delete a category, detaching its images
    pub async fn delete_category(&self, nursery_id: i64, id: i64) -> Result<(), ServiceError> {
        self.require_category(nursery_id, id).await?;

        self.category_repo
            .delete(id)
            .await
            .context("Failed to delete category")?;

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

    async fn require_category(&self, nursery_id: i64, category_id: i64) -> Result<(), ServiceError> {
        let category = self
            .category_repo
            .get_by_id(category_id)
            .await
            .context("Failed to check category")?
            .ok_or(ServiceError::NotFound("Category"))?;
        if category.nursery_id != nursery_id {
            return Err(ServiceError::NotFound("Category"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{MemoryStore, NurseryRepository};
    use crate::models::{CreateNurseryInput, Nursery};

    async fn setup() -> (GalleryService, i64) {
        let store = MemoryStore::shared();
        let nursery = NurseryRepository::create(
            store.as_ref(),
            &Nursery::from_input(CreateNurseryInput {
                name: "Gallery Nursery".to_string(),
                location: "gallery".to_string(),
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

        (
            GalleryService::new(store.clone(), store.clone(), store),
            nursery.id,
        )
    }

    fn image_input(status: ImageStatus) -> CreateGalleryImageInput {
        CreateGalleryImageInput {
            category_id: None,
            title: Some("Snap".to_string()),
            image_url: "/uploads/snap.jpg".to_string(),
            status,
            featured: false,
            sort_order: 0,
        }
    }

    #[tokio::test]
    async fn test_public_listing_hides_drafts() {
        let (svc, nursery_id) = setup().await;
        svc.create_image(nursery_id, None, image_input(ImageStatus::Draft))
            .await
            .unwrap();
        svc.create_image(nursery_id, None, image_input(ImageStatus::Published))
            .await
            .unwrap();
        svc.create_image(nursery_id, None, image_input(ImageStatus::Archived))
            .await
            .unwrap();

        let page = svc
            .list_public(nursery_id, None, None, &ListParams::default())
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].status, ImageStatus::Published);
    }

    #[tokio::test]
    async fn test_admin_listing_sees_everything() {
        let (svc, nursery_id) = setup().await;
        svc.create_image(nursery_id, None, image_input(ImageStatus::Draft))
            .await
            .unwrap();
        svc.create_image(nursery_id, None, image_input(ImageStatus::Published))
            .await
            .unwrap();

        let page = svc
            .list_admin(nursery_id, None, None, None, &ListParams::default())
            .await
            .unwrap();

        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_publishing_records_approver() {
        let (svc, nursery_id) = setup().await;
        let image = svc
            .create_image(nursery_id, Some(5), image_input(ImageStatus::Draft))
            .await
            .unwrap();

        let updated = svc
            .update_image(
                nursery_id,
                image.id,
                Some(9),
                UpdateGalleryImageInput {
                    status: Some(ImageStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, ImageStatus::Published);
        assert_eq!(updated.approved_by, Some(9));
    }

    #[tokio::test]
    async fn test_image_cannot_use_other_nurserys_category() {
        let (svc, nursery_id) = setup().await;
        // Category id that does not exist at all
        let mut input = image_input(ImageStatus::Draft);
        input.category_id = Some(12345);

        let result = svc.create_image(nursery_id, None, input).await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_category_name_conflicts() {
        let (svc, nursery_id) = setup().await;
        svc.create_category(
            nursery_id,
            CreateGalleryCategoryInput {
                name: "Trips".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();

        let result = svc
            .create_category(
                nursery_id,
                CreateGalleryCategoryInput {
                    name: "Trips".to_string(),
                    description: None,
                },
            )
            .await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }
}
