//! Content gap analysis for a blog

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use super::validate_finite;
use crate::domain::data_service::{DataRequest, ProcedureCall};
use crate::domain::query::{is_present, Query, QueryKey};

pub const DEFAULT_GAP_THRESHOLD: f64 = 0.5;
const STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// A topic or keyword the blog does not cover well
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentGap {
    pub keyword_id: Option<String>,
    pub keyword: String,
    pub niche: Option<String>,
    pub search_volume: Option<i64>,
    pub best_similarity: Option<f64>,
    pub gap_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameters for `analyze_content_gaps`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ContentGapsQuery {
    pub blog_id: String,
    #[validate(range(min = 0.0, max = 1.0), custom(function = "validate_finite"))]
    pub gap_threshold: f64,
}

impl Default for ContentGapsQuery {
    fn default() -> Self {
        Self {
            blog_id: String::new(),
            gap_threshold: DEFAULT_GAP_THRESHOLD,
        }
    }
}

impl ContentGapsQuery {
    pub fn for_blog(blog_id: impl Into<String>) -> Self {
        Self {
            blog_id: blog_id.into(),
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, gap_threshold: f64) -> Self {
        self.gap_threshold = gap_threshold;
        self
    }
}

impl Query for ContentGapsQuery {
    type Row = ContentGap;
    const CAPABILITY: &'static str = "content_gaps";

    fn key(&self) -> QueryKey {
        QueryKey::new(Self::CAPABILITY)
            .with(&self.blog_id)
            .with(self.gap_threshold)
    }

    fn request(&self) -> DataRequest {
        ProcedureCall::new("analyze_content_gaps")
            .arg("p_blog_id", self.blog_id.clone())
            .arg("gap_threshold", self.gap_threshold)
            .into()
    }

    fn stale_time(&self) -> Duration {
        STALE_TIME
    }

    fn is_enabled(&self) -> bool {
        is_present(&self.blog_id)
    }
}
