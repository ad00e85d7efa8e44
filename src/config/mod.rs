//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheConfig, DataServiceConfig, LogFormat, LoggingConfig, ServerConfig,
};
