//! Page shells

use serde::Serialize;
use serde_json::Value;

use super::Panel;
use crate::domain::DomainError;

/// Pages the dashboard can compose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Analytics,
    Content,
    Keywords,
    Monetization,
}

impl PageKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "analytics" => Some(Self::Analytics),
            "content" => Some(Self::Content),
            "keywords" => Some(Self::Keywords),
            "monetization" => Some(Self::Monetization),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Analytics => "Analytics",
            Self::Content => "Content",
            Self::Keywords => "Keywords",
            Self::Monetization => "Monetization",
        }
    }
}

/// One panel of a page, already rendered to JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedPanel {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub panel: Value,
}

impl NamedPanel {
    pub fn new<T: Serialize>(
        id: impl Into<String>,
        title: impl Into<String>,
        panel: &Panel<T>,
    ) -> Result<Self, DomainError> {
        let panel = serde_json::to_value(panel)
            .map_err(|e| DomainError::internal(format!("Failed to render panel: {}", e)))?;

        Ok(Self {
            id: id.into(),
            title: title.into(),
            panel,
        })
    }

    pub fn state(&self) -> Option<&str> {
        self.panel.get("state").and_then(Value::as_str)
    }
}

/// A page: a title plus its panels in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPage {
    pub page: PageKind,
    pub title: String,
    pub panels: Vec<NamedPanel>,
}

impl DashboardPage {
    pub fn new(page: PageKind, panels: Vec<NamedPanel>) -> Self {
        Self {
            page,
            title: page.title().to_string(),
            panels,
        }
    }

    pub fn panel(&self, id: &str) -> Option<&NamedPanel> {
        self.panels.iter().find(|p| p.id == id)
    }
}
