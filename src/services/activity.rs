//! Activity service
//!
//! Best-effort audit trail of admin actions. Recording never fails the
//! operation being recorded; a storage error is logged and swallowed.

use crate::db::repositories::ActivityLogRepository;
use crate::models::{ActivityLog, ListParams, NewActivityLog, PagedResult};
use crate::services::ServiceError;
use anyhow::Context;
use std::sync::Arc;

/// Activity service
pub struct ActivityService {
    activity_repo: Arc<dyn ActivityLogRepository>,
}

impl ActivityService {
    pub fn new(activity_repo: Arc<dyn ActivityLogRepository>) -> Self {
        Self { activity_repo }
    }

    /// Record an action. Failures are logged, never propagated.
    pub async fn record(&self, entry: NewActivityLog) {
        if let Err(e) = self.activity_repo.create(&entry).await {
            tracing::warn!(
                action = %entry.action,
                entity_type = %entry.entity_type,
                "Failed to record activity: {:#}",
                e
            );
        }
    }

    /// List activity, newest first, optionally scoped to one nursery
    pub async fn list(
        &self,
        nursery_id: Option<i64>,
        params: &ListParams,
    ) -> Result<PagedResult<ActivityLog>, ServiceError> {
        Ok(self
            .activity_repo
            .list(nursery_id, params)
            .await
            .context("Failed to list activity")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::MemoryStore;

    #[tokio::test]
    async fn test_record_then_list() {
        let svc = ActivityService::new(MemoryStore::shared());

        svc.record(
            NewActivityLog::new(1, "nursery.create", "nursery", 2).with_detail("Sunshine House"),
        )
        .await;

        let page = svc
            .list(None, &ListParams::default())
            .await
            .expect("Failed to list activity");

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].action, "nursery.create");
    }

    #[tokio::test]
    async fn test_list_scopes_by_nursery() {
        let svc = ActivityService::new(MemoryStore::shared());

        svc.record(NewActivityLog::new(1, "event.create", "event", 1).in_nursery(Some(7)))
            .await;
        svc.record(NewActivityLog::new(1, "event.create", "event", 2).in_nursery(Some(8)))
            .await;

        let page = svc.list(Some(7), &ListParams::default()).await.unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].nursery_id, Some(7));
    }
}
