//! Embedding coverage statistics

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::data_service::{DataRequest, ProcedureCall};
use crate::domain::query::{Query, QueryKey};

const STALE_TIME: Duration = Duration::from_secs(60);

/// Embedding coverage for one table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsStats {
    pub table_name: String,
    pub total_rows: i64,
    pub rows_with_embeddings: i64,
    pub rows_without_embeddings: i64,
    pub coverage_percentage: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmbeddingsStats {
    /// Coverage in percent, derived from the counts when the service omits it
    pub fn coverage(&self) -> f64 {
        match self.coverage_percentage {
            Some(percentage) => percentage,
            None if self.total_rows > 0 => {
                self.rows_with_embeddings as f64 * 100.0 / self.total_rows as f64
            }
            None => 0.0,
        }
    }
}

/// `check_embeddings_stats()` takes no parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmbeddingsStatsQuery;

impl Query for EmbeddingsStatsQuery {
    type Row = EmbeddingsStats;
    const CAPABILITY: &'static str = "embeddings_stats";

    fn key(&self) -> QueryKey {
        QueryKey::new(Self::CAPABILITY)
    }

    fn request(&self) -> DataRequest {
        ProcedureCall::new("check_embeddings_stats").into()
    }

    fn stale_time(&self) -> Duration {
        STALE_TIME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_has_no_args() {
        match EmbeddingsStatsQuery.request() {
            DataRequest::Procedure(call) => {
                assert_eq!(call.name(), "check_embeddings_stats");
                assert!(call.args().is_empty());
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_coverage_derived_from_counts() {
        let stats = EmbeddingsStats {
            table_name: "posts".to_string(),
            total_rows: 200,
            rows_with_embeddings: 150,
            rows_without_embeddings: 50,
            ..Default::default()
        };

        assert_eq!(stats.coverage(), 75.0);
    }

    #[test]
    fn test_coverage_of_empty_table() {
        assert_eq!(EmbeddingsStats::default().coverage(), 0.0);
    }

    #[test]
    fn test_reported_coverage_wins() {
        let stats = EmbeddingsStats {
            total_rows: 10,
            rows_with_embeddings: 1,
            coverage_percentage: Some(12.5),
            ..Default::default()
        };

        assert_eq!(stats.coverage(), 12.5);
    }
}
