//! Page shell endpoint

use axum::extract::{Path, State};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Query};
use crate::domain::{DashboardPage, PageKind};
use crate::infrastructure::services::PageParams;

/// GET /api/pages/{page}
///
/// Always 200 for a known page; failures show up in the affected panels.
pub async fn get_page(
    State(state): State<AppState>,
    Path(page): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<DashboardPage>, ApiError> {
    let kind = PageKind::parse(&page)
        .ok_or_else(|| ApiError::not_found(format!("Page '{}' not found", page)))?;

    let page = state.pages.page(kind, &params).await?;
    Ok(Json(page))
}
