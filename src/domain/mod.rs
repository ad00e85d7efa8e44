//! Domain layer - query contracts, row types and view-models

pub mod analytics;
pub mod content;
pub mod data_service;
pub mod error;
pub mod presentation;
pub mod query;

pub use analytics::{
    ContentGap, ContentGapsQuery, EmbeddingsStats, EmbeddingsStatsQuery, HybridSearchQuery,
    HybridSearchResult, KeywordRecommendation, KeywordRecommendationsQuery, NicheStatistic,
    NicheStatisticsQuery, SemanticDuplicate, SemanticDuplicatesQuery,
};
pub use content::{
    Keyword, KeywordFilters, KeywordsQuery, Post, PostFilters, PostStatus, PostUpdate, PostsQuery,
    RevenueEntry, RevenueFilters, RevenueQuery, RevenueSummary, KEYWORDS_TABLE, POSTS_TABLE,
    REVENUE_TABLE,
};
pub use data_service::{
    encode_vector, ColumnFilter, DataRequest, DataServiceClient, FilterOp, Order, ProcedureCall,
    TableSelect,
};
pub use error::DomainError;
pub use presentation::{DashboardPage, EmptyState, NamedPanel, PageKind, Panel, PanelContext};
pub use query::{KeyPart, Query, QueryData, QueryKey, QueryState, StalePolicy};

/// Every capability name a query key can start with
pub fn capabilities() -> [&'static str; 9] {
    [
        ContentGapsQuery::CAPABILITY,
        EmbeddingsStatsQuery::CAPABILITY,
        HybridSearchQuery::CAPABILITY,
        KeywordRecommendationsQuery::CAPABILITY,
        NicheStatisticsQuery::CAPABILITY,
        SemanticDuplicatesQuery::CAPABILITY,
        PostsQuery::CAPABILITY,
        KeywordsQuery::CAPABILITY,
        RevenueQuery::CAPABILITY,
    ]
}
