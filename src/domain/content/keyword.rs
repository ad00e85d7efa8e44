//! Keywords table

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::domain::data_service::{ColumnFilter, DataRequest, Order, TableSelect};
use crate::domain::query::{present, Query, QueryKey};

pub const KEYWORDS_TABLE: &str = "keywords";
const KEYWORDS_PAGE_SIZE: u32 = 200;
const STALE_TIME: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Keyword {
    pub id: String,
    pub keyword: String,
    pub niche: Option<String>,
    pub search_volume: Option<i64>,
    pub difficulty: Option<f64>,
    pub cpc: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct KeywordFilters {
    pub niche: Option<String>,
    #[validate(length(max = 200))]
    pub search: Option<String>,
}

impl KeywordFilters {
    pub fn has_active_filters(&self) -> bool {
        present(self.niche.as_deref()).is_some() || present(self.search.as_deref()).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeywordsQuery {
    pub filters: KeywordFilters,
}

impl KeywordsQuery {
    pub fn new(filters: KeywordFilters) -> Self {
        Self { filters }
    }
}

impl Query for KeywordsQuery {
    type Row = Keyword;
    const CAPABILITY: &'static str = "keywords";

    fn key(&self) -> QueryKey {
        QueryKey::new(Self::CAPABILITY)
            .with(present(self.filters.niche.as_deref()))
            .with(present(self.filters.search.as_deref()))
    }

    fn request(&self) -> DataRequest {
        let mut select = TableSelect::new(KEYWORDS_TABLE)
            .order(Order::desc("search_volume"))
            .limit(KEYWORDS_PAGE_SIZE);

        if let Some(niche) = present(self.filters.niche.as_deref()) {
            select = select.filter(ColumnFilter::eq("niche", niche));
        }

        if let Some(search) = present(self.filters.search.as_deref()) {
            select = select.filter(ColumnFilter::contains("keyword", search));
        }

        select.into()
    }

    fn stale_time(&self) -> Duration {
        STALE_TIME
    }
}
