//! Contact submission model
//!
//! Public inbound contact-form records. Not tied to authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A submitted contact form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    /// Unique identifier
    pub id: i64,
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Sender phone (optional)
    pub phone: Option<String>,
    /// Message body
    pub message: String,
    /// Nursery the enquiry concerns, if selected on the form
    pub nursery_id: Option<i64>,
    /// Submission timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for a new contact submission
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContactInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub nursery_id: Option<i64>,
}

impl ContactSubmission {
    /// Build a submission from form input
    pub fn from_input(input: CreateContactInput) -> Self {
        Self {
            id: 0,
            name: input.name,
            email: input.email,
            phone: input.phone,
            message: input.message,
            nursery_id: input.nursery_id,
            created_at: Utc::now(),
        }
    }
}
