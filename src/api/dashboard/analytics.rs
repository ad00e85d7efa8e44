//! Analytics endpoints

use axum::extract::{Path, State};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Query, QueryResponse};
use crate::domain::{
    ContentGap, ContentGapsQuery, EmbeddingsStats, HybridSearchQuery, HybridSearchResult,
    KeywordRecommendation, KeywordRecommendationsQuery, NicheStatistic, SemanticDuplicate,
    SemanticDuplicatesQuery,
};

/// GET /api/analytics/content-gaps?blog_id=..&gap_threshold=..
pub async fn content_gaps(
    State(state): State<AppState>,
    Query(query): Query<ContentGapsQuery>,
) -> Result<Json<QueryResponse<ContentGap>>, ApiError> {
    debug!(blog_id = %query.blog_id, gap_threshold = query.gap_threshold, "Content gaps");
    let fetched = state.analytics.content_gaps(&query).await?;
    Ok(Json(fetched.into()))
}

/// GET /api/analytics/embeddings-stats
pub async fn embeddings_stats(
    State(state): State<AppState>,
) -> Result<Json<QueryResponse<EmbeddingsStats>>, ApiError> {
    let fetched = state.analytics.embeddings_stats().await?;
    Ok(Json(fetched.into()))
}

/// POST /api/analytics/search
pub async fn hybrid_search(
    State(state): State<AppState>,
    Json(query): Json<HybridSearchQuery>,
) -> Result<Json<QueryResponse<HybridSearchResult>>, ApiError> {
    let fetched = state.analytics.hybrid_search(&query).await?;
    Ok(Json(fetched.into()))
}

/// GET /api/analytics/posts/{post_id}/keyword-recommendations
pub async fn keyword_recommendations(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(mut query): Query<KeywordRecommendationsQuery>,
) -> Result<Json<QueryResponse<KeywordRecommendation>>, ApiError> {
    query.post_id = post_id;
    let fetched = state.analytics.keyword_recommendations(&query).await?;
    Ok(Json(fetched.into()))
}

/// GET /api/analytics/niche-statistics
pub async fn niche_statistics(
    State(state): State<AppState>,
) -> Result<Json<QueryResponse<NicheStatistic>>, ApiError> {
    let fetched = state.analytics.niche_statistics().await?;
    Ok(Json(fetched.into()))
}

/// GET /api/analytics/semantic-duplicates?table_name=..&similarity_threshold=..
pub async fn semantic_duplicates(
    State(state): State<AppState>,
    Query(query): Query<SemanticDuplicatesQuery>,
) -> Result<Json<QueryResponse<SemanticDuplicate>>, ApiError> {
    let fetched = state.analytics.semantic_duplicates(&query).await?;
    Ok(Json(fetched.into()))
}
