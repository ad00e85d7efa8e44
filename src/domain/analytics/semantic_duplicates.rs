//! Near-duplicate detection over embedded rows

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use super::validate_finite;
use crate::domain::data_service::{DataRequest, ProcedureCall};
use crate::domain::query::{is_present, Query, QueryKey};

pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.9;
pub const DEFAULT_DUPLICATE_TABLE: &str = "posts";
const STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// A pair of rows whose embeddings are closer than the threshold
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticDuplicate {
    pub id1: String,
    pub id2: String,
    pub title1: Option<String>,
    pub title2: Option<String>,
    pub similarity: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameters for `detect_semantic_duplicates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SemanticDuplicatesQuery {
    #[validate(length(max = 63))]
    pub table_name: String,
    #[validate(range(min = 0.0, max = 1.0), custom(function = "validate_finite"))]
    pub similarity_threshold: f64,
}

impl Default for SemanticDuplicatesQuery {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_DUPLICATE_TABLE.to_string(),
            similarity_threshold: DEFAULT_DUPLICATE_THRESHOLD,
        }
    }
}

impl SemanticDuplicatesQuery {
    pub fn for_table(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, similarity_threshold: f64) -> Self {
        self.similarity_threshold = similarity_threshold;
        self
    }
}

impl Query for SemanticDuplicatesQuery {
    type Row = SemanticDuplicate;
    const CAPABILITY: &'static str = "semantic_duplicates";

    fn key(&self) -> QueryKey {
        QueryKey::new(Self::CAPABILITY)
            .with(&self.table_name)
            .with(self.similarity_threshold)
    }

    fn request(&self) -> DataRequest {
        ProcedureCall::new("detect_semantic_duplicates")
            .arg("table_name", self.table_name.clone())
            .arg("similarity_threshold", self.similarity_threshold)
            .into()
    }

    fn stale_time(&self) -> Duration {
        STALE_TIME
    }

    fn is_enabled(&self) -> bool {
        is_present(&self.table_name)
    }
}
