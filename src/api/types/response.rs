//! Response bodies shared by the dashboard endpoints

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::query::QueryData;

/// Rows of one capability plus freshness metadata
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse<T> {
    /// `success`, or `idle` when the parameters did not allow a fetch
    pub status: &'static str,
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub is_stale: bool,
}

impl<T> From<Option<QueryData<Vec<T>>>> for QueryResponse<T> {
    fn from(fetched: Option<QueryData<Vec<T>>>) -> Self {
        match fetched {
            Some(data) => Self {
                status: "success",
                data: data.rows,
                updated_at: Some(data.updated_at),
                is_stale: data.is_stale,
            },
            None => Self {
                status: "idle",
                data: Vec::new(),
                updated_at: None,
                is_stale: false,
            },
        }
    }
}
