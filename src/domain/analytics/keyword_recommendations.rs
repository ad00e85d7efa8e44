//! Keyword recommendations for a post

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use super::validate_finite;
use crate::domain::data_service::{DataRequest, ProcedureCall};
use crate::domain::query::{is_present, Query, QueryKey};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MAX_RECOMMENDATIONS: u32 = 10;
const STALE_TIME: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordRecommendation {
    pub keyword_id: String,
    pub keyword: String,
    pub search_volume: Option<i64>,
    pub difficulty: Option<f64>,
    pub similarity: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameters for `recommend_keywords_for_post`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct KeywordRecommendationsQuery {
    pub post_id: String,
    #[validate(range(min = 0.0, max = 1.0), custom(function = "validate_finite"))]
    pub similarity_threshold: f64,
    #[validate(range(min = 1, max = 100))]
    pub max_recommendations: u32,
}

impl Default for KeywordRecommendationsQuery {
    fn default() -> Self {
        Self {
            post_id: String::new(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
        }
    }
}

impl KeywordRecommendationsQuery {
    pub fn for_post(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            ..Self::default()
        }
    }
}

impl Query for KeywordRecommendationsQuery {
    type Row = KeywordRecommendation;
    const CAPABILITY: &'static str = "keyword_recommendations";

    fn key(&self) -> QueryKey {
        QueryKey::new(Self::CAPABILITY)
            .with(&self.post_id)
            .with(self.similarity_threshold)
            .with(self.max_recommendations)
    }

    fn request(&self) -> DataRequest {
        ProcedureCall::new("recommend_keywords_for_post")
            .arg("p_post_id", self.post_id.clone())
            .arg("similarity_threshold", self.similarity_threshold)
            .arg("max_recommendations", self.max_recommendations)
            .into()
    }

    fn stale_time(&self) -> Duration {
        STALE_TIME
    }

    fn is_enabled(&self) -> bool {
        is_present(&self.post_id)
    }
}
