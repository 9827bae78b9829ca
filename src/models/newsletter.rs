//! Newsletter model
//!
//! Newsletters are periodic documents published for parents. A newsletter
//! normally belongs to one nursery; a `nursery_id` of `None` marks a
//! broadcast visible to every nursery's page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Newsletter entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Newsletter {
    /// Unique identifier
    pub id: i64,
    /// Owning nursery; `None` means an all-nurseries broadcast
    pub nursery_id: Option<i64>,
    /// Title
    pub title: String,
    /// Summary or body text
    pub description: Option<String>,
    /// Attached document URL (typically a PDF under /uploads)
    pub file_url: Option<String>,
    /// Publish date shown to parents
    pub published_at: DateTime<Utc>,
    /// Optional free-text tag (e.g. "summer-term")
    pub tag: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a newsletter
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNewsletterInput {
    pub title: String,
    pub description: Option<String>,
    pub file_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub tag: Option<String>,
}

/// Input for updating a newsletter; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNewsletterInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub tag: Option<String>,
}

/// Server-side filters for newsletter listings
#[derive(Debug, Clone, Default)]
pub struct NewsletterFilter {
    /// Restrict to one nursery's newsletters (broadcasts excluded)
    pub nursery_id: Option<i64>,
    /// Include broadcasts alongside the nursery filter
    pub include_broadcasts: bool,
    /// Exact tag match
    pub tag: Option<String>,
    /// Case-insensitive substring match on title/description
    pub search: Option<String>,
}

impl Newsletter {
    /// Build a newsletter from creation input
    pub fn from_input(nursery_id: Option<i64>, input: CreateNewsletterInput) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            nursery_id,
            title: input.title,
            description: input.description,
            file_url: input.file_url,
            published_at: input.published_at.unwrap_or(now),
            tag: input.tag,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update in place
    pub fn apply_update(&mut self, input: UpdateNewsletterInput) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if input.description.is_some() {
            self.description = input.description;
        }
        if input.file_url.is_some() {
            self.file_url = input.file_url;
        }
        if let Some(published_at) = input.published_at {
            self.published_at = published_at;
        }
        if input.tag.is_some() {
            self.tag = input.tag;
        }
        self.updated_at = Utc::now();
    }

    /// Check whether this newsletter matches the given filter
    pub fn matches(&self, filter: &NewsletterFilter) -> bool {
        if let Some(nursery_id) = filter.nursery_id {
            let scoped = self.nursery_id == Some(nursery_id);
            let broadcast = filter.include_broadcasts && self.nursery_id.is_none();
            if !scoped && !broadcast {
                return false;
            }
        }
        if let Some(ref tag) = filter.tag {
            if self.tag.as_deref() != Some(tag.as_str()) {
                return false;
            }
        }
        if let Some(ref search) = filter.search {
            let needle = search.to_lowercase();
            let in_title = self.title.to_lowercase().contains(&needle);
            let in_description = self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn newsletter(nursery_id: Option<i64>, title: &str, tag: Option<&str>) -> Newsletter {
        Newsletter::from_input(
            nursery_id,
            CreateNewsletterInput {
                title: title.to_string(),
                description: Some("Summer term round-up".to_string()),
                file_url: None,
                published_at: None,
                tag: tag.map(String::from),
            },
        )
    }

    #[test]
    fn test_filter_by_nursery_excludes_others() {
        let filter = NewsletterFilter {
            nursery_id: Some(1),
            ..Default::default()
        };

        assert!(newsletter(Some(1), "Ours", None).matches(&filter));
        assert!(!newsletter(Some(2), "Theirs", None).matches(&filter));
        assert!(!newsletter(None, "Broadcast", None).matches(&filter));
    }

    #[test]
    fn test_filter_includes_broadcasts_when_asked() {
        let filter = NewsletterFilter {
            nursery_id: Some(1),
            include_broadcasts: true,
            ..Default::default()
        };

        assert!(newsletter(Some(1), "Ours", None).matches(&filter));
        assert!(newsletter(None, "Broadcast", None).matches(&filter));
        assert!(!newsletter(Some(2), "Theirs", None).matches(&filter));
    }

    #[test]
    fn test_filter_by_tag() {
        let filter = NewsletterFilter {
            tag: Some("summer-term".to_string()),
            ..Default::default()
        };

        assert!(newsletter(Some(1), "A", Some("summer-term")).matches(&filter));
        assert!(!newsletter(Some(1), "B", Some("winter-term")).matches(&filter));
        assert!(!newsletter(Some(1), "C", None).matches(&filter));
    }

    #[test]
    fn test_filter_search_is_case_insensitive() {
        let filter = NewsletterFilter {
            search: Some("SUMMER".to_string()),
            ..Default::default()
        };

        // Matches in description
        assert!(newsletter(Some(1), "June news", None).matches(&filter));

        let filter = NewsletterFilter {
            search: Some("sports day".to_string()),
            ..Default::default()
        };
        assert!(!newsletter(Some(1), "June news", None).matches(&filter));
    }
}
