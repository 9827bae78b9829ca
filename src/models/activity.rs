//! Activity log model
//!
//! Append-only audit records for authenticated mutations. Rows are never
//! updated or deleted through the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded audit entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    /// Unique identifier
    pub id: i64,
    /// Acting user (None if the account was since deleted)
    pub user_id: Option<i64>,
    /// Action name, e.g. "event.create"
    pub action: String,
    /// Affected entity type, e.g. "event"
    pub entity_type: String,
    /// Affected entity id
    pub entity_id: Option<i64>,
    /// Nursery context, if the action was nursery-scoped
    pub nursery_id: Option<i64>,
    /// Optional human-readable detail
    pub detail: Option<String>,
    /// When the action happened
    pub created_at: DateTime<Utc>,
}

/// An audit entry about to be written
#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub user_id: Option<i64>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub nursery_id: Option<i64>,
    pub detail: Option<String>,
}

impl NewActivityLog {
    /// Convenience constructor for the common case
    pub fn new(
        user_id: i64,
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: i64,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: Some(entity_id),
            nursery_id: None,
            detail: None,
        }
    }

    /// Attach a nursery context
    pub fn in_nursery(mut self, nursery_id: Option<i64>) -> Self {
        self.nursery_id = nursery_id;
        self
    }

    /// Attach a free-text detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
