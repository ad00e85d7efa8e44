//! Posts table and post editor

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::domain::data_service::{ColumnFilter, DataRequest, Order, TableSelect};
use crate::domain::query::{present, Query, QueryKey};

pub const POSTS_TABLE: &str = "posts";
const POSTS_PAGE_SIZE: u32 = 100;
const STALE_TIME: Duration = Duration::from_secs(30);

/// Publication status of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub id: String,
    pub blog_id: Option<String>,
    pub title: String,
    pub slug: Option<String>,
    pub status: Option<PostStatus>,
    pub content: Option<String>,
    pub meta_description: Option<String>,
    pub word_count: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filters of the posts table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PostFilters {
    pub blog_id: Option<String>,
    pub status: Option<PostStatus>,
    #[validate(length(max = 200))]
    pub search: Option<String>,
}

impl PostFilters {
    /// True when any filter narrows the table
    pub fn has_active_filters(&self) -> bool {
        present(self.blog_id.as_deref()).is_some()
            || self.status.is_some()
            || present(self.search.as_deref()).is_some()
    }
}

/// Read of the posts table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PostsQuery {
    pub filters: PostFilters,
}

impl PostsQuery {
    pub fn new(filters: PostFilters) -> Self {
        Self { filters }
    }
}

impl Query for PostsQuery {
    type Row = Post;
    const CAPABILITY: &'static str = "posts";

    fn key(&self) -> QueryKey {
        QueryKey::new(Self::CAPABILITY)
            .with(present(self.filters.blog_id.as_deref()))
            .with(self.filters.status.map(|s| s.as_str()))
            .with(present(self.filters.search.as_deref()))
    }

    fn request(&self) -> DataRequest {
        let mut select = TableSelect::new(POSTS_TABLE)
            .order(Order::desc("updated_at"))
            .limit(POSTS_PAGE_SIZE);

        if let Some(blog_id) = present(self.filters.blog_id.as_deref()) {
            select = select.filter(ColumnFilter::eq("blog_id", blog_id));
        }

        if let Some(status) = self.filters.status {
            select = select.filter(ColumnFilter::eq("status", status.as_str()));
        }

        if let Some(search) = present(self.filters.search.as_deref()) {
            select = select.filter(ColumnFilter::contains("title", search));
        }

        select.into()
    }

    fn stale_time(&self) -> Duration {
        STALE_TIME
    }
}

/// Changes submitted from the post editor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 160))]
    pub meta_description: Option<String>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.status.is_none()
            && self.meta_description.is_none()
    }
}
