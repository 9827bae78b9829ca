//! Contact service
//!
//! Public enquiry form submissions and the admin inbox over them. When a
//! submission names a nursery, the nursery must exist.

use crate::db::repositories::{ContactSubmissionRepository, NurseryRepository};
use crate::models::{ContactSubmission, CreateContactInput, ListParams, PagedResult};
use crate::services::ServiceError;
use anyhow::Context;
use std::sync::Arc;

/// Contact service
pub struct ContactService {
    contact_repo: Arc<dyn ContactSubmissionRepository>,
    nursery_repo: Arc<dyn NurseryRepository>,
}

impl ContactService {
    pub fn new(
        contact_repo: Arc<dyn ContactSubmissionRepository>,
        nursery_repo: Arc<dyn NurseryRepository>,
    ) -> Self {
        Self {
            contact_repo,
            nursery_repo,
        }
    }

    /// Store a submission from the public form
    pub async fn submit(&self, input: CreateContactInput) -> Result<ContactSubmission, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::validation("Name is required"));
        }
        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(ServiceError::validation("A valid email is required"));
        }
        if input.message.trim().is_empty() {
            return Err(ServiceError::validation("Message is required"));
        }
        if let Some(nursery_id) = input.nursery_id {
            self.nursery_repo
                .get_by_id(nursery_id)
                .await
                .context("Failed to check nursery")?
                .ok_or(ServiceError::NotFound("Nursery"))?;
        }

        let created = self
            .contact_repo
            .create(&ContactSubmission::from_input(input))
            .await
            .context("Failed to store contact submission")?;

        Ok(created)
    }

    /// List submissions for the admin inbox, newest first
    pub async fn list(
        &self,
        params: &ListParams,
    ) -> Result<PagedResult<ContactSubmission>, ServiceError> {
        Ok(self
            .contact_repo
            .list(params)
            .await
            .context("Failed to list contact submissions")?)
    }

    /// Delete a submission from the inbox
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.contact_repo
            .get_by_id(id)
            .await
            .context("Failed to get contact submission")?
            .ok_or(ServiceError::NotFound("Submission"))?;

        self.contact_repo
            .delete(id)
            .await
            .context("Failed to delete contact submission")?;

        Ok(())
    }
}
