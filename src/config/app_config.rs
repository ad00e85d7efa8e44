use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::domain::{DomainError, StalePolicy};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub data_service: DataServiceConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Hosted database REST endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataServiceConfig {
    /// Project URL, without the `/rest/v1` suffix
    pub url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_capacity: u64,
    /// Unused entries are dropped after this many seconds
    pub gc_time_secs: u64,
    pub stale_policy: StalePolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DataServiceConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl DataServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            gc_time_secs: 30 * 60,
            stale_policy: StalePolicy::default(),
        }
    }
}

impl CacheConfig {
    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_time_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject configurations the app cannot start with
    pub fn validate(&self) -> Result<(), DomainError> {
        let url = Url::parse(&self.data_service.url).map_err(|e| {
            DomainError::configuration(format!(
                "Invalid data_service.url '{}': {}",
                self.data_service.url, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::configuration(format!(
                "data_service.url must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.data_service.api_key.trim().is_empty() {
            return Err(DomainError::configuration(
                "data_service.api_key is required (APP__DATA_SERVICE__API_KEY)",
            ));
        }

        if self.data_service.timeout_secs == 0 {
            return Err(DomainError::configuration(
                "data_service.timeout_secs must be greater than zero",
            ));
        }

        if self.cache.max_capacity == 0 {
            return Err(DomainError::configuration(
                "cache.max_capacity must be greater than zero",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn from_toml(source: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.data_service.api_key = "anon-key".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.cache.stale_policy, StalePolicy::Revalidate);
        assert_eq!(config.data_service.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = from_toml(
            r#"
            [data_service]
            url = "https://project.supabase.co"
            api_key = "anon-key"

            [cache]
            stale_policy = "serve_stale"
            "#,
        );

        assert_eq!(config.data_service.url, "https://project.supabase.co");
        assert_eq!(config.data_service.timeout_secs, 30);
        assert_eq!(config.cache.stale_policy, StalePolicy::ServeStale);
        assert_eq!(config.cache.max_capacity, 1_000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let result = AppConfig::default().validate();
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_bad_url_rejected() {
        let mut config = valid();
        config.data_service.url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.data_service.url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = valid();
        config.data_service.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.cache.max_capacity = 0;
        assert!(config.validate().is_err());
    }
}
