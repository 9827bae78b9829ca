//! Newsletter service
//!
//! Nursery newsletters plus chain-wide broadcasts. A broadcast has no
//! nursery and shows up in every nursery's public listing.

use crate::db::repositories::{NewsletterRepository, NurseryRepository};
use crate::models::{
    CreateNewsletterInput, ListParams, Newsletter, NewsletterFilter, PagedResult,
    UpdateNewsletterInput,
};
use crate::services::ServiceError;
use anyhow::Context;
use std::sync::Arc;

/// Newsletter service
pub struct NewsletterService {
    newsletter_repo: Arc<dyn NewsletterRepository>,
    nursery_repo: Arc<dyn NurseryRepository>,
}

impl NewsletterService {
    pub fn new(
        newsletter_repo: Arc<dyn NewsletterRepository>,
        nursery_repo: Arc<dyn NurseryRepository>,
    ) -> Self {
        Self {
            newsletter_repo,
            nursery_repo,
        }
    }

    /// Create a newsletter for a nursery
    pub async fn create(
        &self,
        nursery_id: i64,
        input: CreateNewsletterInput,
    ) -> Result<Newsletter, ServiceError> {
        self.require_nursery(nursery_id).await?;
        validate_input(&input)?;

        let created = self
            .newsletter_repo
            .create(&Newsletter::from_input(Some(nursery_id), input))
            .await
            .context("Failed to create newsletter")?;

        Ok(created)
    }

    /// Create a broadcast newsletter visible to every nursery
    pub async fn create_broadcast(
        &self,
        input: CreateNewsletterInput,
    ) -> Result<Newsletter, ServiceError> {
        validate_input(&input)?;

        let created = self
            .newsletter_repo
            .create(&Newsletter::from_input(None, input))
            .await
            .context("Failed to create newsletter")?;

        Ok(created)
    }

    /// Get a newsletter scoped to a nursery.
    ///
    /// Broadcasts resolve under any nursery; another nursery's
    /// newsletter is not found.
    pub async fn get(&self, nursery_id: i64, id: i64) -> Result<Newsletter, ServiceError> {
        let newsletter = self
            .newsletter_repo
            .get_by_id(id)
            .await
            .context("Failed to get newsletter")?
            .ok_or(ServiceError::NotFound("Newsletter"))?;

        match newsletter.nursery_id {
            None => Ok(newsletter),
            Some(owner) if owner == nursery_id => Ok(newsletter),
            Some(_) => Err(ServiceError::NotFound("Newsletter")),
        }
    }

    /// List a nursery's newsletters, optionally folding in broadcasts
    pub async fn list(
        &self,
        nursery_id: i64,
        include_broadcasts: bool,
        tag: Option<String>,
        search: Option<String>,
        params: &ListParams,
    ) -> Result<PagedResult<Newsletter>, ServiceError> {
        self.require_nursery(nursery_id).await?;

        let filter = NewsletterFilter {
            nursery_id: Some(nursery_id),
            include_broadcasts,
            tag,
            search,
        };

        Ok(self
            .newsletter_repo
            .list(&filter, params)
            .await
            .context("Failed to list newsletters")?)
    }

    /// List broadcasts only
    pub async fn list_broadcasts(
        &self,
        params: &ListParams,
    ) -> Result<PagedResult<Newsletter>, ServiceError> {
        Ok(self
            .newsletter_repo
            .list_broadcasts(params)
            .await
            .context("Failed to list broadcasts")?)
    }

    /// Update a nursery-scoped newsletter
    pub async fn update(
        &self,
        nursery_id: i64,
        id: i64,
        input: UpdateNewsletterInput,
    ) -> Result<Newsletter, ServiceError> {
        let mut newsletter = self.get(nursery_id, id).await?;

        // Broadcasts show up in per-nursery reads but are not owned by
        // any nursery; they can only be mutated through the chain-wide
        // broadcast routes.
        if newsletter.nursery_id.is_none() {
            return Err(ServiceError::Forbidden(
                "Broadcast newsletters are managed chain-wide".to_string(),
            ));
        }

        if let Some(ref title) = input.title {
            if title.trim().is_empty() {
                return Err(ServiceError::validation("Title is required"));
            }
        }

        newsletter.apply_update(input);

        let updated = self
            .newsletter_repo
            .update(&newsletter)
            .await
            .context("Failed to update newsletter")?;

        Ok(updated)
    }

    /// Delete a newsletter
    pub async fn delete(&self, nursery_id: i64, id: i64) -> Result<(), ServiceError> {
        let newsletter = self.get(nursery_id, id).await?;

        if newsletter.nursery_id.is_none() {
            return Err(ServiceError::Forbidden(
                "Broadcast newsletters are managed chain-wide".to_string(),
            ));
        }

        self.newsletter_repo
            .delete(id)
            .await
            .context("Failed to delete newsletter")?;

        Ok(())
    }

    /// Update a broadcast newsletter
    pub async fn update_broadcast(
        &self,
        id: i64,
        input: UpdateNewsletterInput,
    ) -> Result<Newsletter, ServiceError> {
        let mut newsletter = self.require_broadcast(id).await?;

        if let Some(ref title) = input.title {
            if title.trim().is_empty() {
                return Err(ServiceError::validation("Title is required"));
            }
        }

        newsletter.apply_update(input);

        let updated = self
            .newsletter_repo
            .update(&newsletter)
            .await
            .context("Failed to update newsletter")?;

        Ok(updated)
    }

    /// Delete a broadcast newsletter
    pub async fn delete_broadcast(&self, id: i64) -> Result<(), ServiceError> {
        self.require_broadcast(id).await?;

        self.newsletter_repo
            .delete(id)
            .await
            .context("Failed to delete newsletter")?;

        Ok(())
    }

    /// Fetch a newsletter that must be a broadcast
    async fn require_broadcast(&self, id: i64) -> Result<Newsletter, ServiceError> {
        let newsletter = self
            .newsletter_repo
            .get_by_id(id)
            .await
            .context("Failed to get newsletter")?
            .ok_or(ServiceError::NotFound("Newsletter"))?;

        if newsletter.nursery_id.is_some() {
            return Err(ServiceError::NotFound("Newsletter"));
        }

        Ok(newsletter)
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

fn validate_input(input: &CreateNewsletterInput) -> Result<(), ServiceError> {
    if input.title.trim().is_empty() {
        return Err(ServiceError::validation("Title is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{MemoryStore, NurseryRepository};
    use crate::models::{CreateNurseryInput, Nursery};

    async fn setup() -> (NewsletterService, i64) {
        let store = MemoryStore::shared();
        let nursery = NurseryRepository::create(
            store.as_ref(),
            &Nursery::from_input(CreateNurseryInput {
                name: "Newsletter Nursery".to_string(),
                location: "newsletters".to_string(),
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

        (NewsletterService::new(store.clone(), store), nursery.id)
    }

    fn input(title: &str) -> CreateNewsletterInput {
        CreateNewsletterInput {
            title: title.to_string(),
            description: None,
            file_url: None,
            published_at: None,
            tag: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_existing_nursery() {
        let (svc, _) = setup().await;

        let result = svc.create(999, input("Orphan")).await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_broadcast_resolves_under_any_nursery() {
        let (svc, nursery_id) = setup().await;
        let broadcast = svc
            .create_broadcast(input("Chain News"))
            .await
            .expect("Failed to create broadcast");

        let fetched = svc
            .get(nursery_id, broadcast.id)
            .await
            .expect("Broadcast should resolve under a nursery");

        assert!(fetched.nursery_id.is_none());
    }

    #[tokio::test]
    async fn test_list_includes_broadcasts_when_asked() {
        let (svc, nursery_id) = setup().await;
        svc.create(nursery_id, input("Local")).await.unwrap();
        svc.create_broadcast(input("Global")).await.unwrap();

        let without = svc
            .list(nursery_id, false, None, None, &ListParams::default())
            .await
            .unwrap();
        let with = svc
            .list(nursery_id, true, None, None, &ListParams::default())
            .await
            .unwrap();

        assert_eq!(without.total, 1);
        assert_eq!(with.total, 2);
    }

    #[tokio::test]
    async fn test_scoped_update_rejects_broadcast() {
        let (svc, nursery_id) = setup().await;
        let broadcast = svc.create_broadcast(input("Chain News")).await.unwrap();

        let result = svc
            .update(
                nursery_id,
                broadcast.id,
                UpdateNewsletterInput {
                    title: Some("Defaced".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
        let untouched = svc.get(nursery_id, broadcast.id).await.unwrap();
        assert_eq!(untouched.title, "Chain News");
    }

    #[tokio::test]
    async fn test_scoped_delete_rejects_broadcast() {
        let (svc, nursery_id) = setup().await;
        let broadcast = svc.create_broadcast(input("Chain News")).await.unwrap();

        let result = svc.delete(nursery_id, broadcast.id).await;

        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
        assert!(svc.get(nursery_id, broadcast.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_routes_manage_broadcasts_only() {
        let (svc, nursery_id) = setup().await;
        let scoped = svc.create(nursery_id, input("Local")).await.unwrap();
        let broadcast = svc.create_broadcast(input("Chain News")).await.unwrap();

        // A scoped newsletter is invisible to the broadcast operations
        let result = svc.delete_broadcast(scoped.id).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));

        let updated = svc
            .update_broadcast(
                broadcast.id,
                UpdateNewsletterInput {
                    title: Some("Chain News v2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("Broadcast update should succeed");
        assert_eq!(updated.title, "Chain News v2");

        svc.delete_broadcast(broadcast.id)
            .await
            .expect("Broadcast delete should succeed");
    }

    #[tokio::test]
    async fn test_update_scoped_to_owner() {
        let (svc, nursery_id) = setup().await;
        let newsletter = svc.create(nursery_id, input("Mine")).await.unwrap();

        let result = svc
            .update(
                nursery_id + 100,
                newsletter.id,
                UpdateNewsletterInput {
                    title: Some("Stolen".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let (svc, nursery_id) = setup().await;

        let result = svc.create(nursery_id, input("  ")).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
