//! Per-niche content statistics

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::data_service::{DataRequest, ProcedureCall};
use crate::domain::query::{Query, QueryKey};

const STALE_TIME: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NicheStatistic {
    pub niche: String,
    pub blog_count: i64,
    pub post_count: i64,
    pub keyword_count: i64,
    pub avg_word_count: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NicheStatisticsQuery;

impl Query for NicheStatisticsQuery {
    type Row = NicheStatistic;
    const CAPABILITY: &'static str = "niche_statistics";

    fn key(&self) -> QueryKey {
        QueryKey::new(Self::CAPABILITY)
    }

    fn request(&self) -> DataRequest {
        ProcedureCall::new("get_niche_statistics").into()
    }

    fn stale_time(&self) -> Duration {
        STALE_TIME
    }
}
