//! Nursery service
//!
//! Manages the nursery sites themselves. Location slugs are the public
//! URL segment for each site, so they must be unique and URL-safe.

use crate::db::repositories::NurseryRepository;
use crate::models::{CreateNurseryInput, Nursery, UpdateNurseryInput};
use crate::services::ServiceError;
use anyhow::Context;
use std::sync::Arc;

/// Nursery service
pub struct NurseryService {
    nursery_repo: Arc<dyn NurseryRepository>,
}

impl NurseryService {
    pub fn new(nursery_repo: Arc<dyn NurseryRepository>) -> Self {
        Self { nursery_repo }
    }

    /// Create a new nursery
    pub async fn create(&self, input: CreateNurseryInput) -> Result<Nursery, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::validation("Name is required"));
        }
        validate_location(&input.location)?;

        if self
            .nursery_repo
            .exists_by_location(&input.location)
            .await
            .context("Failed to check location")?
        {
            return Err(ServiceError::conflict(format!(
                "Location '{}' is already taken",
                input.location
            )));
        }

        let created = self
            .nursery_repo
            .create(&Nursery::from_input(input))
            .await
            .context("Failed to create nursery")?;

        Ok(created)
    }

    /// Get a nursery by ID
    pub async fn get(&self, id: i64) -> Result<Nursery, ServiceError> {
        self.nursery_repo
            .get_by_id(id)
            .await
            .context("Failed to get nursery")?
            .ok_or(ServiceError::NotFound("Nursery"))
    }

    /// Get a nursery by its location slug
    pub async fn get_by_location(&self, location: &str) -> Result<Nursery, ServiceError> {
        self.nursery_repo
            .get_by_location(location)
            .await
            .context("Failed to get nursery")?
            .ok_or(ServiceError::NotFound("Nursery"))
    }

    /// List all nurseries
    pub async fn list(&self) -> Result<Vec<Nursery>, ServiceError> {
        Ok(self
            .nursery_repo
            .list()
            .await
            .context("Failed to list nurseries")?)
    }

    /// Update a nursery
    pub async fn update(
        &self,
        id: i64,
        input: UpdateNurseryInput,
    ) -> Result<Nursery, ServiceError> {
        let mut nursery = self.get(id).await?;

        if let Some(ref location) = input.location {
            validate_location(location)?;
            if *location != nursery.location
                && self
                    .nursery_repo
                    .exists_by_location(location)
                    .await
                    .context("Failed to check location")?
            {
                return Err(ServiceError::conflict(format!(
                    "Location '{}' is already taken",
                    location
                )));
            }
        }

        nursery.apply_update(input);

        let updated = self
            .nursery_repo
            .update(&nursery)
            .await
            .context("Failed to update nursery")?;

        Ok(updated)
    }

    /// Delete a nursery; its events, newsletters and gallery go with it
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.get(id).await?;

        self.nursery_repo
            .delete(id)
            .await
            .context("Failed to delete nursery")?;

        Ok(())
    }
}

fn validate_location(location: &str) -> Result<(), ServiceError> {
    if location.trim().is_empty() {
        return Err(ServiceError::validation("Location is required"));
    }
    if !location
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ServiceError::validation(
            "Location may only contain lowercase letters, digits and hyphens",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::MemoryStore;

    fn service() -> NurseryService {
        NurseryService::new(MemoryStore::shared())
    }

    fn input(name: &str, location: &str) -> CreateNurseryInput {
        CreateNurseryInput {
            name: name.to_string(),
            location: location.to_string(),
            address: "1 High Street".to_string(),
            phone: None,
            email: None,
            opening_hours: None,
            hero_image: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_by_location() {
        let svc = service();

        let created = svc
            .create(input("Sunshine House", "sunshine"))
            .await
            .expect("Failed to create nursery");
        let fetched = svc
            .get_by_location("sunshine")
            .await
            .expect("Failed to fetch nursery");

        assert_eq!(created.id, fetched.id);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_location() {
        let svc = service();

        for bad in ["", "Has Spaces", "UPPER", "slash/y"] {
            let result = svc.create(input("Nursery", bad)).await;
            assert!(
                matches!(result, Err(ServiceError::Validation(_))),
                "Location '{}' should be rejected",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_create_duplicate_location_conflicts() {
        let svc = service();
        svc.create(input("First", "taken")).await.unwrap();

        let result = svc.create(input("Second", "taken")).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_can_keep_own_location() {
        let svc = service();
        let created = svc.create(input("Original", "stable")).await.unwrap();

        let updated = svc
            .update(
                created.id,
                UpdateNurseryInput {
                    name: Some("Renamed".to_string()),
                    location: Some("stable".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("Update with unchanged location should succeed");

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.location, "stable");
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let svc = service();

        assert!(matches!(svc.get(404).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            svc.get_by_location("missing").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let svc = service();

        assert!(matches!(svc.delete(404).await, Err(ServiceError::NotFound(_))));
    }
}
