//! Query result and state types

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::DomainError;

/// Data produced by a successful fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryData<T> {
    pub rows: T,
    pub updated_at: DateTime<Utc>,
    /// True when served from an entry past its stale time
    pub is_stale: bool,
}

impl<T> QueryData<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryData<U> {
        QueryData {
            rows: f(self.rows),
            updated_at: self.updated_at,
            is_stale: self.is_stale,
        }
    }
}

/// Observable state of a query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// Enablement predicate is false, nothing was fetched
    Idle,
    Loading,
    Success(QueryData<T>),
    Error(DomainError),
}

impl<T> QueryState<T> {
    /// Build a state from a cache lookup (`None` means the query was disabled)
    pub fn from_result(result: Result<Option<QueryData<T>>, DomainError>) -> Self {
        match result {
            Ok(Some(data)) => Self::Success(data),
            Ok(None) => Self::Idle,
            Err(e) => Self::Error(e),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(&data.rows),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&DomainError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Error(_) => "error",
        }
    }
}
