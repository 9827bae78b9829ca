//! Event model
//!
//! Events belong to exactly one nursery (open days, parent evenings,
//! seasonal fairs). They surface on the nursery's public page ordered by
//! start time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier
    pub id: i64,
    /// Owning nursery
    pub nursery_id: i64,
    /// Event title
    pub title: String,
    /// Event description
    pub description: Option<String>,
    /// Start of the event window
    pub starts_at: DateTime<Utc>,
    /// End of the event window (optional)
    pub ends_at: Option<DateTime<Utc>>,
    /// Free-text location within or near the nursery
    pub location: Option<String>,
    /// User who created the event
    pub created_by: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an event
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventInput {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

/// Input for updating an event; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<Option<DateTime<Utc>>>,
    pub location: Option<String>,
}

impl Event {
    /// Build an event from creation input
    pub fn from_input(nursery_id: i64, created_by: Option<i64>, input: CreateEventInput) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            nursery_id,
            title: input.title,
            description: input.description,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            location: input.location,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update in place
    pub fn apply_update(&mut self, input: UpdateEventInput) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if input.description.is_some() {
            self.description = input.description;
        }
        if let Some(starts_at) = input.starts_at {
            self.starts_at = starts_at;
        }
        if let Some(ends_at) = input.ends_at {
            self.ends_at = ends_at;
        }
        if input.location.is_some() {
            self.location = input.location;
        }
        self.updated_at = Utc::now();
    }
}
