//! Monetization revenue records

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::data_service::{ColumnFilter, DataRequest, Order, TableSelect};
use crate::domain::query::{present, Query, QueryKey};

pub const REVENUE_TABLE: &str = "revenue";
const REVENUE_PAGE_SIZE: u32 = 500;
const STALE_TIME: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueEntry {
    pub id: String,
    pub post_id: Option<String>,
    /// Revenue source, e.g. "adsense" or "affiliate"
    pub source: String,
    pub amount: f64,
    pub currency: String,
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueFilters {
    pub source: Option<String>,
    pub post_id: Option<String>,
}

impl RevenueFilters {
    pub fn has_active_filters(&self) -> bool {
        present(self.source.as_deref()).is_some() || present(self.post_id.as_deref()).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RevenueQuery {
    pub filters: RevenueFilters,
}

impl RevenueQuery {
    pub fn new(filters: RevenueFilters) -> Self {
        Self { filters }
    }
}

impl Query for RevenueQuery {
    type Row = RevenueEntry;
    const CAPABILITY: &'static str = "revenue";

    fn key(&self) -> QueryKey {
        QueryKey::new(Self::CAPABILITY)
            .with(present(self.filters.source.as_deref()))
            .with(present(self.filters.post_id.as_deref()))
    }

    fn request(&self) -> DataRequest {
        let mut select = TableSelect::new(REVENUE_TABLE)
            .order(Order::desc("recorded_at"))
            .limit(REVENUE_PAGE_SIZE);

        if let Some(source) = present(self.filters.source.as_deref()) {
            select = select.filter(ColumnFilter::eq("source", source));
        }

        if let Some(post_id) = present(self.filters.post_id.as_deref()) {
            select = select.filter(ColumnFilter::eq("post_id", post_id));
        }

        select.into()
    }

    fn stale_time(&self) -> Duration {
        STALE_TIME
    }
}

/// Revenue totals for the monetization view
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RevenueSummary {
    /// Total per currency
    pub totals: BTreeMap<String, f64>,
    /// Total per (source, currency)
    pub by_source: BTreeMap<String, BTreeMap<String, f64>>,
    pub entry_count: usize,
}

impl RevenueSummary {
    pub fn from_entries(entries: &[RevenueEntry]) -> Self {
        let mut summary = Self {
            entry_count: entries.len(),
            ..Self::default()
        };

        for entry in entries {
            *summary.totals.entry(entry.currency.clone()).or_default() += entry.amount;
            *summary
                .by_source
                .entry(entry.source.clone())
                .or_default()
                .entry(entry.currency.clone())
                .or_default() += entry.amount;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_padded_filters_normalized() {
        let padded = RevenueQuery::new(RevenueFilters {
            source: Some("adsense ".to_string()),
            post_id: Some(String::new()),
        });
        let plain = RevenueQuery::new(RevenueFilters {
            source: Some("adsense".to_string()),
            post_id: None,
        });

        assert_eq!(padded.key(), plain.key());
        assert_eq!(padded.request(), plain.request());
    }

    fn entry(source: &str, amount: f64, currency: &str) -> RevenueEntry {
        RevenueEntry {
            source: source.to_string(),
            amount,
            currency: currency.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_totals() {
        let entries = vec![
            entry("adsense", 10.0, "USD"),
            entry("affiliate", 5.5, "USD"),
            entry("adsense", 2.5, "USD"),
            entry("affiliate", 3.0, "EUR"),
        ];

        let summary = RevenueSummary::from_entries(&entries);

        assert_eq!(summary.entry_count, 4);
        assert_eq!(summary.totals.get("USD"), Some(&18.0));
        assert_eq!(summary.totals.get("EUR"), Some(&3.0));
        assert_eq!(summary.by_source["adsense"]["USD"], 12.5);
        assert_eq!(summary.by_source["affiliate"]["EUR"], 3.0);
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = RevenueSummary::from_entries(&[]);
        assert_eq!(summary.entry_count, 0);
        assert!(summary.totals.is_empty());
    }

    #[test]
    fn test_source_filter() {
        let query = RevenueQuery::new(RevenueFilters {
            source: Some("adsense".to_string()),
            post_id: None,
        });

        match query.request() {
            DataRequest::Select(select) => {
                assert_eq!(select.filters, vec![ColumnFilter::eq("source", "adsense")]);
            }
            other => panic!("unexpected request {:?}", other),
        }
        assert!(query.filters.has_active_filters());
    }
}
