//! Infrastructure layer - data service transport, query cache and services

pub mod data_service;
pub mod logging;
pub mod query_cache;
pub mod services;
