//! Infrastructure services

mod analytics_service;
mod content_service;
mod page_service;

pub use analytics_service::{AnalyticsService, QueryResult};
pub use content_service::ContentService;
pub use page_service::{PageParams, PageService};
