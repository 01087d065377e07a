use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Blog, Tag};
use crate::pagination::SortOrder;

/// Entry entity - a single blog post.
///
/// `id` is assigned by the store on creation. On writes, `blog` and `tags`
/// are references: only their ids are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub blog: Option<Blog>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Entry {
    pub fn new(title: impl Into<String>, content: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            date,
            blog: None,
            tags: Vec::new(),
        }
    }

    pub fn in_blog(mut self, blog_id: i64) -> Self {
        self.blog = Some(Blog::reference(blog_id));
        self
    }

    pub fn with_tags(mut self, tag_ids: impl IntoIterator<Item = i64>) -> Self {
        self.tags = tag_ids.into_iter().map(Tag::reference).collect();
        self
    }

    pub fn blog_id(&self) -> Option<i64> {
        self.blog.as_ref().and_then(|b| b.id)
    }

    pub fn tag_ids(&self) -> Vec<i64> {
        self.tags.iter().filter_map(|t| t.id).collect()
    }

    /// Compare two entries on a sortable property.
    ///
    /// Returns `None` for properties that are not sortable.
    pub fn compare_by(&self, other: &Self, property: &str) -> Option<Ordering> {
        let ordering = match property {
            "id" => self.id.cmp(&other.id),
            "title" => self.title.cmp(&other.title),
            "content" => self.content.cmp(&other.content),
            "date" => self.date.cmp(&other.date),
            _ => return None,
        };
        Some(ordering)
    }

    /// Chain `orders` into one comparison; unknown properties are skipped.
    pub fn compare_by_orders(&self, other: &Self, orders: &[SortOrder]) -> Ordering {
        orders
            .iter()
            .filter_map(|order| {
                self.compare_by(other, &order.property).map(|ordering| {
                    if order.direction.is_ascending() {
                        ordering
                    } else {
                        ordering.reverse()
                    }
                })
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}
