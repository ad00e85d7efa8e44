//! Dashboard API - analytics, content tables, pages and cache control

mod analytics;
mod cache;
mod content;
mod pages;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::api::state::AppState;

pub fn create_dashboard_router() -> Router<AppState> {
    Router::new()
        // Analytics
        .route("/analytics/content-gaps", get(analytics::content_gaps))
        .route("/analytics/embeddings-stats", get(analytics::embeddings_stats))
        .route("/analytics/search", post(analytics::hybrid_search))
        .route(
            "/analytics/posts/{post_id}/keyword-recommendations",
            get(analytics::keyword_recommendations),
        )
        .route("/analytics/niche-statistics", get(analytics::niche_statistics))
        .route(
            "/analytics/semantic-duplicates",
            get(analytics::semantic_duplicates),
        )
        // Content management
        .route("/content/posts", get(content::list_posts))
        .route("/content/posts/{post_id}", patch(content::update_post))
        .route("/content/keywords", get(content::list_keywords))
        .route("/monetization/revenue", get(content::revenue))
        // Page shells
        .route("/pages/{page}", get(pages::get_page))
        // Cache control
        .route("/cache/invalidate", post(cache::invalidate))
}
