//! Content service - management tables, post editor and revenue

use tracing::{debug, info};
use validator::Validate;

use super::analytics_service::QueryResult;
use super::AnalyticsService;
use crate::domain::data_service::ColumnFilter;
use crate::domain::query::{is_present, Query, QueryData};
use crate::domain::{
    DomainError, Keyword, KeywordFilters, KeywordsQuery, Post, PostFilters, PostUpdate,
    PostsQuery, RevenueEntry, RevenueFilters, RevenueQuery, RevenueSummary, POSTS_TABLE,
};
use crate::infrastructure::query_cache::QueryCache;

/// Tables behind the content and monetization pages
#[derive(Debug, Clone)]
pub struct ContentService {
    cache: QueryCache,
}

impl ContentService {
    pub fn new(cache: QueryCache) -> Self {
        Self { cache }
    }

    pub async fn posts(&self, filters: PostFilters) -> QueryResult<Post> {
        filters.validate()?;
        self.cache.fetch_query(&PostsQuery::new(filters)).await
    }

    pub async fn keywords(&self, filters: KeywordFilters) -> QueryResult<Keyword> {
        filters.validate()?;
        self.cache.fetch_query(&KeywordsQuery::new(filters)).await
    }

    pub async fn revenue(&self, filters: RevenueFilters) -> QueryResult<RevenueEntry> {
        self.cache.fetch_query(&RevenueQuery::new(filters)).await
    }

    /// Revenue totals computed from the same cached rows as the table
    pub async fn revenue_summary(
        &self,
        filters: RevenueFilters,
    ) -> Result<Option<QueryData<RevenueSummary>>, DomainError> {
        let entries = self.revenue(filters).await?;
        Ok(entries.map(|data| data.map(|rows| RevenueSummary::from_entries(&rows))))
    }

    /// Apply an editor change to one post
    ///
    /// The posts table and every analytics capability derived from posts are
    /// invalidated afterwards.
    pub async fn update_post(&self, post_id: &str, update: PostUpdate) -> Result<Post, DomainError> {
        if !is_present(post_id) {
            return Err(DomainError::validation("Post ID is required"));
        }

        update.validate()?;

        if update.is_empty() {
            return Err(DomainError::validation("No changes to apply"));
        }

        let patch = serde_json::to_value(&update)
            .map_err(|e| DomainError::internal(format!("Failed to encode post update: {}", e)))?;

        let rows = self
            .cache
            .client()
            .update(POSTS_TABLE, &[ColumnFilter::eq("id", post_id)], &patch)
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::not_found(format!("Post '{}' not found", post_id)))?;

        let post: Post = serde_json::from_value(row)
            .map_err(|e| DomainError::decode(format!("Failed to decode updated post: {}", e)))?;

        info!(post_id = %post_id, "Post updated");

        let mut dropped = self.cache.invalidate_capability(PostsQuery::CAPABILITY).await;
        for capability in AnalyticsService::post_derived_capabilities() {
            dropped += self.cache.invalidate_capability(capability).await;
        }
        debug!(post_id = %post_id, dropped, "Invalidated post-derived queries");

        Ok(post)
    }
}
