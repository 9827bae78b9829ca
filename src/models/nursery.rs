//! Nursery model
//!
//! A nursery is a physical childcare location and the primary
//! tenant-partitioning unit: events, newsletters and gallery content all
//! belong to a nursery. The `location` slug is unique and used in public
//! page URLs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nursery entity representing a physical childcare location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nursery {
    /// Unique identifier
    pub id: i64,
    /// Display name (e.g. "Little Oaks Richmond")
    pub name: String,
    /// URL slug, unique (e.g. "richmond")
    pub location: String,
    /// Street address
    pub address: String,
    /// Contact phone number
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Free-text opening hours (e.g. "Mon-Fri 7:30-18:00")
    pub opening_hours: Option<String>,
    /// Hero image URL for the public page
    pub hero_image: Option<String>,
    /// Marketing description
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a nursery
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNurseryInput {
    pub name: String,
    pub location: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub opening_hours: Option<String>,
    pub hero_image: Option<String>,
    pub description: Option<String>,
}

/// Input for updating a nursery; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNurseryInput {
    pub name: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub opening_hours: Option<String>,
    pub hero_image: Option<String>,
    pub description: Option<String>,
}

impl Nursery {
    /// Build a nursery from creation input (id assigned by the store)
    pub fn from_input(input: CreateNurseryInput) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: input.name,
            location: input.location,
            address: input.address,
            phone: input.phone,
            email: input.email,
            opening_hours: input.opening_hours,
            hero_image: input.hero_image,
            description: input.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update in place, leaving `None` fields untouched
    pub fn apply_update(&mut self, input: UpdateNurseryInput) {
        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(location) = input.location {
            self.location = location;
        }
        if let Some(address) = input.address {
            self.address = address;
        }
        if input.phone.is_some() {
            self.phone = input.phone;
        }
        if input.email.is_some() {
            self.email = input.email;
        }
        if input.opening_hours.is_some() {
            self.opening_hours = input.opening_hours;
        }
        if input.hero_image.is_some() {
            self.hero_image = input.hero_image;
        }
        if input.description.is_some() {
            self.description = input.description;
        }
        self.updated_at = Utc::now();
    }
}
