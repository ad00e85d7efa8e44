//! Empty-state messages

use serde::Serialize;

/// Message shown when a table or panel has no rows
///
/// Distinguishes "nothing exists yet" from "nothing matches the filters".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub title: String,
    pub message: String,
    pub has_active_filters: bool,
}

impl EmptyState {
    /// `subject` is the plural noun of the rows, e.g. "posts"
    pub fn new(subject: &str, has_active_filters: bool) -> Self {
        let message = if has_active_filters {
            format!(
                "No {} match the current filters. Try adjusting your filters.",
                subject
            )
        } else {
            format!("There are no {} yet.", subject)
        };

        Self {
            title: format!("No {} found", subject),
            message,
            has_active_filters,
        }
    }
}
