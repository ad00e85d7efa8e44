//! Analytics domain - one query description per remote analytics procedure

use validator::ValidationError;

mod content_gaps;
mod embeddings_stats;
mod hybrid_search;
mod keyword_recommendations;
mod niche_statistics;
mod semantic_duplicates;

pub use content_gaps::{ContentGap, ContentGapsQuery, DEFAULT_GAP_THRESHOLD};
pub use embeddings_stats::{EmbeddingsStats, EmbeddingsStatsQuery};
pub use hybrid_search::{DEFAULT_MATCH_COUNT, HybridSearchQuery, HybridSearchResult};
pub use keyword_recommendations::{
    DEFAULT_MAX_RECOMMENDATIONS, DEFAULT_SIMILARITY_THRESHOLD, KeywordRecommendation,
    KeywordRecommendationsQuery,
};
pub use niche_statistics::{NicheStatistic, NicheStatisticsQuery};
pub use semantic_duplicates::{
    DEFAULT_DUPLICATE_TABLE, DEFAULT_DUPLICATE_THRESHOLD, SemanticDuplicate,
    SemanticDuplicatesQuery,
};

/// `range` lets NaN through, so thresholds are also checked for finiteness
fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite").with_message("must be a finite number".into()))
    }
}
