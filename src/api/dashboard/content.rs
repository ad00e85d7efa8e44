//! Content management and monetization endpoints

use axum::extract::{Path, State};
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Query, QueryResponse};
use crate::domain::{
    Keyword, KeywordFilters, Post, PostFilters, PostUpdate, RevenueEntry, RevenueFilters,
    RevenueSummary,
};

/// Revenue table plus its totals
#[derive(Debug, Clone, Serialize)]
pub struct RevenueResponse {
    #[serde(flatten)]
    pub entries: QueryResponse<RevenueEntry>,
    pub summary: RevenueSummary,
}

/// GET /api/content/posts?blog_id=..&status=..&search=..
pub async fn list_posts(
    State(state): State<AppState>,
    Query(filters): Query<PostFilters>,
) -> Result<Json<QueryResponse<Post>>, ApiError> {
    let fetched = state.content.posts(filters).await?;
    Ok(Json(fetched.into()))
}

/// PATCH /api/content/posts/{post_id}
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(update): Json<PostUpdate>,
) -> Result<Json<Post>, ApiError> {
    info!(post_id = %post_id, "Updating post");
    let post = state.content.update_post(&post_id, update).await?;
    Ok(Json(post))
}

/// GET /api/content/keywords?niche=..&search=..
pub async fn list_keywords(
    State(state): State<AppState>,
    Query(filters): Query<KeywordFilters>,
) -> Result<Json<QueryResponse<Keyword>>, ApiError> {
    let fetched = state.content.keywords(filters).await?;
    Ok(Json(fetched.into()))
}

/// GET /api/monetization/revenue?source=..&post_id=..
pub async fn revenue(
    State(state): State<AppState>,
    Query(filters): Query<RevenueFilters>,
) -> Result<Json<RevenueResponse>, ApiError> {
    let entries: QueryResponse<RevenueEntry> = state.content.revenue(filters).await?.into();
    let summary = RevenueSummary::from_entries(&entries.data);

    Ok(Json(RevenueResponse { entries, summary }))
}
