//! Gallery models
//!
//! Gallery images belong to a nursery and optionally to a category within
//! that nursery. Images move through a draft/published/archived lifecycle
//! and are ordered by an explicit sort order, then recency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gallery image entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Unique identifier
    pub id: i64,
    /// Owning nursery
    pub nursery_id: i64,
    /// Optional category within the nursery
    pub category_id: Option<i64>,
    /// Caption/title shown under the image
    pub title: Option<String>,
    /// Image URL (under /uploads)
    pub image_url: String,
    /// Publication status
    pub status: ImageStatus,
    /// Featured images surface on the nursery home page
    pub featured: bool,
    /// Explicit ordering within the gallery (ascending)
    pub sort_order: i64,
    /// User who uploaded the image
    pub uploaded_by: Option<i64>,
    /// Admin who approved publication
    pub approved_by: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Image publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    /// Uploaded but not yet visible publicly
    #[default]
    Draft,
    /// Visible on the public gallery
    Published,
    /// Hidden from the public gallery but retained
    Archived,
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageStatus::Draft => write!(f, "draft"),
            ImageStatus::Published => write!(f, "published"),
            ImageStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for ImageStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ImageStatus::Draft),
            "published" => Ok(ImageStatus::Published),
            "archived" => Ok(ImageStatus::Archived),
            _ => Err(anyhow::anyhow!("Invalid image status: {}", s)),
        }
    }
}

/// Gallery category entity (an album within a nursery)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryCategory {
    /// Unique identifier
    pub id: i64,
    /// Owning nursery
    pub nursery_id: i64,
    /// Category name (e.g. "Forest School")
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a gallery image
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGalleryImageInput {
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub status: ImageStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sort_order: i64,
}

/// Input for updating a gallery image; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGalleryImageInput {
    pub category_id: Option<Option<i64>>,
    pub title: Option<String>,
    pub status: Option<ImageStatus>,
    pub featured: Option<bool>,
    pub sort_order: Option<i64>,
}

/// Input for creating a gallery category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGalleryCategoryInput {
    pub name: String,
    pub description: Option<String>,
}

/// Server-side filters for gallery listings
#[derive(Debug, Clone, Default)]
pub struct GalleryFilter {
    /// Restrict to one nursery
    pub nursery_id: Option<i64>,
    /// Restrict to one category
    pub category_id: Option<i64>,
    /// Restrict to one status
    pub status: Option<ImageStatus>,
    /// Only featured images
    pub featured: Option<bool>,
    /// Case-insensitive substring match on title
    pub search: Option<String>,
}

impl GalleryImage {
    /// Build an image from creation input
    pub fn from_input(
        nursery_id: i64,
        uploaded_by: Option<i64>,
        input: CreateGalleryImageInput,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            nursery_id,
            category_id: input.category_id,
            title: input.title,
            image_url: input.image_url,
            status: input.status,
            featured: input.featured,
            sort_order: input.sort_order,
            uploaded_by,
            approved_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update in place.
    ///
    /// Moving an image to Published records the approver.
    pub fn apply_update(&mut self, input: UpdateGalleryImageInput, actor_id: Option<i64>) {
        if let Some(category_id) = input.category_id {
            self.category_id = category_id;
        }
        if input.title.is_some() {
            self.title = input.title;
        }
        if let Some(status) = input.status {
            if status == ImageStatus::Published && self.status != ImageStatus::Published {
                self.approved_by = actor_id;
            }
            self.status = status;
        }
        if let Some(featured) = input.featured {
            self.featured = featured;
        }
        if let Some(sort_order) = input.sort_order {
            self.sort_order = sort_order;
        }
        self.updated_at = Utc::now();
    }

    /// Check whether this image matches the given filter
    pub fn matches(&self, filter: &GalleryFilter) -> bool {
        if let Some(nursery_id) = filter.nursery_id {
            if self.nursery_id != nursery_id {
                return false;
            }
        }
        if let Some(category_id) = filter.category_id {
            if self.category_id != Some(category_id) {
                return false;
            }
        }
        if let Some(status) = filter.status {
            if self.status != status {
                return false;
            }
        }
        if let Some(featured) = filter.featured {
            if self.featured != featured {
                return false;
            }
        }
        if let Some(ref search) = filter.search {
            let needle = search.to_lowercase();
            let matched = self
                .title
                .as_deref()
                .map(|t| t.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !matched {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(nursery_id: i64, status: ImageStatus, title: Option<&str>) -> GalleryImage {
        GalleryImage::from_input(
            nursery_id,
            Some(1),
            CreateGalleryImageInput {
                category_id: None,
                title: title.map(String::from),
                image_url: "/uploads/a.jpg".to_string(),
                status,
                featured: false,
                sort_order: 0,
            },
        )
    }

    #[test]
    fn test_image_status_roundtrip() {
        for status in [ImageStatus::Draft, ImageStatus::Published, ImageStatus::Archived] {
            assert_eq!(ImageStatus::from_str(&status.to_string()).unwrap(), status);
        }
        assert!(ImageStatus::from_str("pending").is_err());
    }

    #[test]
    fn test_publish_records_approver() {
        let mut img = image(1, ImageStatus::Draft, None);
        assert!(img.approved_by.is_none());

        img.apply_update(
            UpdateGalleryImageInput {
                status: Some(ImageStatus::Published),
                ..Default::default()
            },
            Some(42),
        );

        assert_eq!(img.status, ImageStatus::Published);
        assert_eq!(img.approved_by, Some(42));
    }

    #[test]
    fn test_republish_keeps_original_approver() {
        let mut img = image(1, ImageStatus::Draft, None);
        img.apply_update(
            UpdateGalleryImageInput {
                status: Some(ImageStatus::Published),
                ..Default::default()
            },
            Some(42),
        );
        // Already published, approver stays
        img.apply_update(
            UpdateGalleryImageInput {
                status: Some(ImageStatus::Published),
                ..Default::default()
            },
            Some(99),
        );
        assert_eq!(img.approved_by, Some(42));
    }

    #[test]
    fn test_filter_by_status_and_nursery() {
        let filter = GalleryFilter {
            nursery_id: Some(1),
            status: Some(ImageStatus::Published),
            ..Default::default()
        };

        assert!(image(1, ImageStatus::Published, None).matches(&filter));
        assert!(!image(1, ImageStatus::Draft, None).matches(&filter));
        assert!(!image(2, ImageStatus::Published, None).matches(&filter));
    }

    #[test]
    fn test_filter_search_on_title() {
        let filter = GalleryFilter {
            search: Some("sports".to_string()),
            ..Default::default()
        };

        assert!(image(1, ImageStatus::Draft, Some("Sports Day 2025")).matches(&filter));
        assert!(!image(1, ImageStatus::Draft, Some("Nativity play")).matches(&filter));
        assert!(!image(1, ImageStatus::Draft, None).matches(&filter));
    }
}
