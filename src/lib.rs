//! Content Ops Dashboard
//!
//! Data layer and JSON API for a blog content-operations dashboard:
//! - Typed queries over a hosted Postgres's REST and RPC endpoints
//! - A keyed query cache with request de-duplication and stale times
//! - Panel and page view-models with empty, inactive and error states

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use infrastructure::data_service::{HttpClient, PostgrestClient};
use infrastructure::query_cache::{QueryCache, QueryCacheConfig};

/// Build the shared services from configuration
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let http = HttpClient::with_timeout(config.data_service.timeout())?;
    let client = PostgrestClient::new(
        http,
        config.data_service.url.as_str(),
        config.data_service.api_key.as_str(),
    );

    let cache_config = QueryCacheConfig::default()
        .with_max_capacity(config.cache.max_capacity)
        .with_gc_time(config.cache.gc_time())
        .with_stale_policy(config.cache.stale_policy);
    let cache = QueryCache::with_config(Arc::new(client), cache_config);

    info!(
        data_service = %config.data_service.url,
        max_capacity = config.cache.max_capacity,
        stale_policy = ?config.cache.stale_policy,
        "Application state created"
    );

    Ok(AppState::new(cache))
}
