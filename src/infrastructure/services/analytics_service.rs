//! Analytics service - one typed entry point per analytics procedure

use tracing::debug;
use validator::Validate;

use crate::domain::query::{Query, QueryData};
use crate::domain::{
    ContentGap, ContentGapsQuery, DomainError, EmbeddingsStats, EmbeddingsStatsQuery,
    HybridSearchQuery, HybridSearchResult, KeywordRecommendation, KeywordRecommendationsQuery,
    NicheStatistic, NicheStatisticsQuery, SemanticDuplicate, SemanticDuplicatesQuery,
};
use crate::infrastructure::query_cache::QueryCache;

/// Outcome of a cached read; `Ok(None)` means the query was disabled
pub type QueryResult<T> = Result<Option<QueryData<Vec<T>>>, DomainError>;

/// Read-only analytics over the data service
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    cache: QueryCache,
}

impl AnalyticsService {
    pub fn new(cache: QueryCache) -> Self {
        Self { cache }
    }

    /// Keywords the blog has no good content for
    pub async fn content_gaps(&self, query: &ContentGapsQuery) -> QueryResult<ContentGap> {
        query.validate()?;
        self.cache.fetch_query(query).await
    }

    /// Embedding coverage per table
    pub async fn embeddings_stats(&self) -> QueryResult<EmbeddingsStats> {
        self.cache.fetch_query(&EmbeddingsStatsQuery).await
    }

    /// Combined full-text and vector search over posts
    pub async fn hybrid_search(&self, query: &HybridSearchQuery) -> QueryResult<HybridSearchResult> {
        query.validate()?;

        if let Some(embedding) = &query.embedding {
            if embedding.iter().any(|v| !v.is_finite()) {
                return Err(DomainError::validation(
                    "Embedding values must be finite numbers",
                ));
            }
        }

        debug!(
            match_count = query.match_count,
            has_embedding = query.embedding.is_some(),
            "Hybrid search"
        );
        self.cache.fetch_query(query).await
    }

    /// Keywords semantically close to a post
    pub async fn keyword_recommendations(
        &self,
        query: &KeywordRecommendationsQuery,
    ) -> QueryResult<KeywordRecommendation> {
        query.validate()?;
        self.cache.fetch_query(query).await
    }

    pub async fn niche_statistics(&self) -> QueryResult<NicheStatistic> {
        self.cache.fetch_query(&NicheStatisticsQuery).await
    }

    /// Pairs of rows whose embeddings are nearly identical
    pub async fn semantic_duplicates(
        &self,
        query: &SemanticDuplicatesQuery,
    ) -> QueryResult<SemanticDuplicate> {
        query.validate()?;
        self.cache.fetch_query(query).await
    }

    /// Capabilities whose rows are derived from posts
    pub fn post_derived_capabilities() -> [&'static str; 4] {
        [
            ContentGapsQuery::CAPABILITY,
            HybridSearchQuery::CAPABILITY,
            KeywordRecommendationsQuery::CAPABILITY,
            SemanticDuplicatesQuery::CAPABILITY,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::data_service::MockDataServiceClient;
    use mockall::predicate::function;
    use std::sync::Arc;

    fn service(client: MockDataServiceClient) -> AnalyticsService {
        AnalyticsService::new(QueryCache::new(Arc::new(client)))
    }

    #[tokio::test]
    async fn test_content_gaps_calls_procedure_with_defaults() {
        let mut client = MockDataServiceClient::new();
        client
            .expect_call_procedure()
            .with(function(|call: &crate::domain::ProcedureCall| {
                call.name() == "analyze_content_gaps"
                    && call.get("p_blog_id") == Some(&serde_json::json!("blog-1"))
                    && call.get("gap_threshold") == Some(&serde_json::json!(0.5))
            }))
            .times(1)
            .returning(|_| Ok(vec![serde_json::json!({"keyword": "rust async"})]));

        let result = service(client)
            .content_gaps(&ContentGapsQuery::for_blog("blog-1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.rows[0].keyword, "rust async");
    }

    #[tokio::test]
    async fn test_invalid_threshold_rejected_before_fetch() {
        let mut client = MockDataServiceClient::new();
        client.expect_call_procedure().never();

        let result = service(client)
            .content_gaps(&ContentGapsQuery::for_blog("blog-1").with_threshold(1.5))
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_search_rejects_non_finite_embedding() {
        let mut client = MockDataServiceClient::new();
        client.expect_call_procedure().never();

        let query = HybridSearchQuery::new("rust").with_embedding(vec![0.1, f32::NAN]);
        let result = service(client).hybrid_search(&query).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_blank_search_is_disabled() {
        let mut client = MockDataServiceClient::new();
        client.expect_call_procedure().never();

        let result = service(client)
            .hybrid_search(&HybridSearchQuery::new("   "))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_remote_error_propagates_unchanged() {
        let mut client = MockDataServiceClient::new();
        client
            .expect_call_procedure()
            .returning(|call| Err(DomainError::remote(call.name(), "HTTP 500: boom")));

        let result = service(client).niche_statistics().await;

        assert_eq!(
            result.unwrap_err(),
            DomainError::remote("get_niche_statistics", "HTTP 500: boom")
        );
    }

    #[tokio::test]
    async fn test_semantic_duplicates_defaults_to_posts() {
        let mut client = MockDataServiceClient::new();
        client
            .expect_call_procedure()
            .with(function(|call: &crate::domain::ProcedureCall| {
                call.name() == "detect_semantic_duplicates"
                    && call.get("table_name") == Some(&serde_json::json!("posts"))
                    && call.get("similarity_threshold") == Some(&serde_json::json!(0.9))
            }))
            .times(1)
            .returning(|_| Ok(vec![]));

        let result = service(client)
            .semantic_duplicates(&SemanticDuplicatesQuery::default())
            .await
            .unwrap()
            .unwrap();

        assert!(result.rows.is_empty());
    }
}
