//! Page service - composes dashboard pages out of independent panels

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::analytics_service::QueryResult;
use super::{AnalyticsService, ContentService};
use crate::domain::query::QueryState;
use crate::domain::{
    ContentGapsQuery, DashboardPage, DomainError, KeywordFilters, KeywordRecommendationsQuery,
    NamedPanel, PageKind, Panel, PanelContext, PostFilters, RevenueFilters, RevenueSummary,
    SemanticDuplicatesQuery,
};

/// Optional selections a page can be opened with
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub blog_id: Option<String>,
    pub post_id: Option<String>,
    pub search: Option<String>,
    pub niche: Option<String>,
    pub source: Option<String>,
}

fn panel<T: Serialize>(
    id: &str,
    title: &str,
    result: QueryResult<T>,
    context: &PanelContext,
) -> Result<NamedPanel, DomainError> {
    if let Err(e) = &result {
        warn!(panel = %id, error = %e, "Panel failed to load");
    }

    let panel = Panel::from_state(QueryState::from_result(result), context);
    NamedPanel::new(id, title, &panel)
}

/// Builds page shells; each panel's query runs concurrently and fails alone
#[derive(Debug, Clone)]
pub struct PageService {
    analytics: AnalyticsService,
    content: ContentService,
}

impl PageService {
    pub fn new(analytics: AnalyticsService, content: ContentService) -> Self {
        Self { analytics, content }
    }

    pub async fn page(&self, kind: PageKind, params: &PageParams) -> Result<DashboardPage, DomainError> {
        debug!(page = ?kind, "Building page");

        let panels = match kind {
            PageKind::Analytics => self.analytics_panels(params).await?,
            PageKind::Content => self.content_panels(params).await?,
            PageKind::Keywords => self.keywords_panels(params).await?,
            PageKind::Monetization => self.monetization_panels(params).await?,
        };

        Ok(DashboardPage::new(kind, panels))
    }

    async fn analytics_panels(&self, params: &PageParams) -> Result<Vec<NamedPanel>, DomainError> {
        let gaps_query = ContentGapsQuery::for_blog(params.blog_id.clone().unwrap_or_default());
        let duplicates_query = SemanticDuplicatesQuery::default();

        let (stats, niches, gaps, duplicates) = futures::join!(
            self.analytics.embeddings_stats(),
            self.analytics.niche_statistics(),
            self.analytics.content_gaps(&gaps_query),
            self.analytics.semantic_duplicates(&duplicates_query),
        );

        Ok(vec![
            panel(
                "embeddings_stats",
                "Embedding coverage",
                stats,
                &PanelContext::new("embedding statistics"),
            )?,
            panel(
                "niche_statistics",
                "Niche statistics",
                niches,
                &PanelContext::new("niche statistics"),
            )?,
            panel(
                "content_gaps",
                "Content gaps",
                gaps,
                &PanelContext::new("content gaps")
                    .with_inactive_hint("Select a blog to analyze its content gaps."),
            )?,
            panel(
                "semantic_duplicates",
                "Duplicate posts",
                duplicates,
                &PanelContext::new("duplicate posts"),
            )?,
        ])
    }

    async fn content_panels(&self, params: &PageParams) -> Result<Vec<NamedPanel>, DomainError> {
        let filters = PostFilters {
            blog_id: params.blog_id.clone(),
            status: None,
            search: params.search.clone(),
        };
        let context = PanelContext::new("posts").with_filters(filters.has_active_filters());

        let posts = self.content.posts(filters).await;

        Ok(vec![panel("posts", "Posts", posts, &context)?])
    }

    async fn keywords_panels(&self, params: &PageParams) -> Result<Vec<NamedPanel>, DomainError> {
        let filters = KeywordFilters {
            niche: params.niche.clone(),
            search: params.search.clone(),
        };
        let context = PanelContext::new("keywords").with_filters(filters.has_active_filters());
        let recommendations_query =
            KeywordRecommendationsQuery::for_post(params.post_id.clone().unwrap_or_default());

        let (keywords, recommendations) = futures::join!(
            self.content.keywords(filters),
            self.analytics.keyword_recommendations(&recommendations_query),
        );

        Ok(vec![
            panel("keywords", "Keywords", keywords, &context)?,
            panel(
                "keyword_recommendations",
                "Recommended keywords",
                recommendations,
                &PanelContext::new("keyword recommendations")
                    .with_inactive_hint("Select a post to see keyword recommendations."),
            )?,
        ])
    }

    async fn monetization_panels(
        &self,
        params: &PageParams,
    ) -> Result<Vec<NamedPanel>, DomainError> {
        let filters = RevenueFilters {
            source: params.source.clone(),
            post_id: params.post_id.clone(),
        };
        let context =
            PanelContext::new("revenue entries").with_filters(filters.has_active_filters());

        let revenue = self.content.revenue(filters).await;
        let summary: QueryResult<RevenueSummary> = revenue.clone().map(|fetched| {
            fetched.map(|data| {
                data.map(|rows| {
                    if rows.is_empty() {
                        Vec::new()
                    } else {
                        vec![RevenueSummary::from_entries(&rows)]
                    }
                })
            })
        });

        Ok(vec![
            panel("revenue", "Revenue", revenue, &context)?,
            panel("revenue_summary", "Revenue summary", summary, &context)?,
        ])
    }
}
