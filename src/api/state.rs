//! Application state for shared services

use crate::infrastructure::query_cache::QueryCache;
use crate::infrastructure::services::{AnalyticsService, ContentService, PageService};

/// Services shared by every handler; clones share one query cache
#[derive(Debug, Clone)]
pub struct AppState {
    pub analytics: AnalyticsService,
    pub content: ContentService,
    pub pages: PageService,
    pub cache: QueryCache,
}

impl AppState {
    pub fn new(cache: QueryCache) -> Self {
        let analytics = AnalyticsService::new(cache.clone());
        let content = ContentService::new(cache.clone());
        let pages = PageService::new(analytics.clone(), content.clone());

        Self {
            analytics,
            content,
            pages,
            cache,
        }
    }
}
