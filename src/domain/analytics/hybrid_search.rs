//! Hybrid (full-text + vector) post search

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::domain::data_service::{encode_vector, DataRequest, ProcedureCall};
use crate::domain::query::{is_present, Query, QueryKey};

pub const DEFAULT_MATCH_COUNT: u32 = 10;
const STALE_TIME: Duration = Duration::from_secs(30);

/// A post matched by the hybrid search
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridSearchResult {
    pub id: String,
    pub blog_id: Option<String>,
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub text_rank: Option<f64>,
    pub similarity: Option<f64>,
    pub combined_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameters for `hybrid_search_posts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HybridSearchQuery {
    #[validate(length(max = 512))]
    pub query: String,
    pub embedding: Option<Vec<f32>>,
    pub blog_id: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub match_count: u32,
}

impl Default for HybridSearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            embedding: None,
            blog_id: None,
            match_count: DEFAULT_MATCH_COUNT,
        }
    }
}

impl HybridSearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn in_blog(mut self, blog_id: impl Into<String>) -> Self {
        self.blog_id = Some(blog_id.into());
        self
    }

    pub fn with_match_count(mut self, match_count: u32) -> Self {
        self.match_count = match_count;
        self
    }
}

impl Query for HybridSearchQuery {
    type Row = HybridSearchResult;
    const CAPABILITY: &'static str = "hybrid_search";

    fn key(&self) -> QueryKey {
        QueryKey::new(Self::CAPABILITY)
            .with(&self.query)
            .with(self.embedding.as_deref())
            .with(self.blog_id.as_deref())
            .with(self.match_count)
    }

    fn request(&self) -> DataRequest {
        let embedding = self
            .embedding
            .as_deref()
            .map(|v| Value::from(encode_vector(v)))
            .unwrap_or(Value::Null);
        let blog_id = self
            .blog_id
            .clone()
            .map(Value::from)
            .unwrap_or(Value::Null);

        ProcedureCall::new("hybrid_search_posts")
            .arg("search_query", self.query.clone())
            .arg("query_embedding", embedding)
            .arg("blog_id_filter", blog_id)
            .arg("match_count", self.match_count)
            .into()
    }

    fn stale_time(&self) -> Duration {
        STALE_TIME
    }

    fn is_enabled(&self) -> bool {
        is_present(&self.query)
    }
}
