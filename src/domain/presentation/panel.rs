//! Panel view-model

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::EmptyState;
use crate::domain::query::QueryState;

/// Renderable state of one query on a page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Panel<T> {
    /// The query's parameters do not allow a fetch yet
    Inactive { hint: String },
    Loading,
    Empty(EmptyState),
    Error { message: String },
    Data {
        rows: Vec<T>,
        updated_at: DateTime<Utc>,
        is_stale: bool,
    },
}

/// Rendering context a panel needs beyond the query state
#[derive(Debug, Clone)]
pub struct PanelContext {
    /// Plural noun of the rows
    pub subject: String,
    pub has_active_filters: bool,
    /// Shown while the query is disabled
    pub inactive_hint: String,
}

impl PanelContext {
    pub fn new(subject: impl Into<String>) -> Self {
        let subject = subject.into();
        Self {
            inactive_hint: format!("Select an item to load {}.", subject),
            subject,
            has_active_filters: false,
        }
    }

    pub fn with_filters(mut self, has_active_filters: bool) -> Self {
        self.has_active_filters = has_active_filters;
        self
    }

    pub fn with_inactive_hint(mut self, hint: impl Into<String>) -> Self {
        self.inactive_hint = hint.into();
        self
    }
}

impl<T> Panel<T> {
    pub fn from_state(state: QueryState<Vec<T>>, context: &PanelContext) -> Self {
        match state {
            QueryState::Idle => Panel::Inactive {
                hint: context.inactive_hint.clone(),
            },
            QueryState::Loading => Panel::Loading,
            QueryState::Error(e) => Panel::Error {
                message: e.to_string(),
            },
            QueryState::Success(data) if data.rows.is_empty() => Panel::Empty(EmptyState::new(
                &context.subject,
                context.has_active_filters,
            )),
            QueryState::Success(data) => Panel::Data {
                rows: data.rows,
                updated_at: data.updated_at,
                is_stale: data.is_stale,
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Panel::Error { .. })
    }

    pub fn rows(&self) -> Option<&[T]> {
        match self {
            Panel::Data { rows, .. } => Some(rows),
            _ => None,
        }
    }
}
