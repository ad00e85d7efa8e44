//! Cache control endpoint

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::capabilities;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvalidateRequest {
    /// Capability to drop; everything when absent
    pub capability: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub invalidated: usize,
}

/// POST /api/cache/invalidate
pub async fn invalidate(
    State(state): State<AppState>,
    Json(request): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>, ApiError> {
    let invalidated = match request.capability.as_deref() {
        Some(capability) => {
            if !capabilities().contains(&capability) {
                return Err(ApiError::bad_request(format!(
                    "Unknown capability '{}'",
                    capability
                ))
                .with_param("capability"));
            }

            state.cache.invalidate_capability(capability).await
        }
        None => state.cache.invalidate_all().await,
    };

    info!(
        capability = request.capability.as_deref().unwrap_or("*"),
        invalidated,
        "Cache invalidated"
    );

    Ok(Json(InvalidateResponse { invalidated }))
}
