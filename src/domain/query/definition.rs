//! Query descriptions

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::QueryKey;
use crate::domain::data_service::DataRequest;

/// How a stale cache entry is handled on access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Block and refetch; callers never see data past its stale time
    #[default]
    Revalidate,
    /// Return the stale rows flagged as stale and refresh in the background
    ServeStale,
}

/// Description of how to fetch one capability
///
/// A query performs no I/O. The cache reads its key, checks the enablement
/// predicate, and executes its request.
pub trait Query: Send + Sync {
    /// Row type the remote rows decode into
    type Row: DeserializeOwned + Send;

    /// Capability name, the first element of every key this query builds
    const CAPABILITY: &'static str;

    /// Key built from the capability and every parameter
    fn key(&self) -> QueryKey;

    /// Request sent to the data service
    fn request(&self) -> DataRequest;

    /// How long fetched rows stay fresh
    fn stale_time(&self) -> Duration;

    /// Whether the parameters allow a fetch at all
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Enablement helper for identifier parameters
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Trimmed optional filter value; blank counts as absent
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_policy_default() {
        assert_eq!(StalePolicy::default(), StalePolicy::Revalidate);
    }

    #[test]
    fn test_stale_policy_deserialize() {
        let policy: StalePolicy = serde_json::from_str("\"serve_stale\"").unwrap();
        assert_eq!(policy, StalePolicy::ServeStale);
    }

    #[test]
    fn test_is_present() {
        assert!(is_present("blog-1"));
        assert!(!is_present(""));
        assert!(!is_present("   "));
    }

    #[test]
    fn test_present_trims_and_drops_blank() {
        assert_eq!(present(Some(" rust ")), Some("rust"));
        assert_eq!(present(Some("  ")), None);
        assert_eq!(present(None), None);
    }
}
