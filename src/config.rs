//! Centralized configuration management for dictadmin

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend REST service
    pub api_base_url: String,
    /// Optional bearer token forwarded on every request
    pub api_token: Option<String>,
    /// Directory where exported spreadsheets are saved
    pub download_dir: PathBuf,
    /// Rows requested per table page
    pub page_size: u64,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "dictadmin/0.1.0".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var("DICTADMIN_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let api_token = std::env::var("DICTADMIN_API_TOKEN").ok();

        let download_dir = std::env::var("DICTADMIN_DOWNLOAD_DIR")
            .unwrap_or_else(|_| "./downloads".to_string())
            .into();

        let page_size = parse_env_var("DICTADMIN_PAGE_SIZE")?.unwrap_or(20);

        let http = HttpConfig {
            timeout_seconds: parse_env_var("DICTADMIN_HTTP_TIMEOUT_SECONDS")?.unwrap_or(30),
            user_agent: std::env::var("DICTADMIN_USER_AGENT")
                .unwrap_or_else(|_| "dictadmin/0.1.0".to_string()),
        };

        Ok(Config {
            api_base_url,
            api_token,
            download_dir,
            page_size,
            http,
        })
    }

    /// Get download directory as string
    pub fn download_dir_str(&self) -> &str {
        self.download_dir.to_str().unwrap_or("./downloads")
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            return Err(anyhow::anyhow!("API base URL must not be empty"));
        }

        if self.page_size == 0 {
            return Err(anyhow::anyhow!("Page size must be at least 1"));
        }

        // Check if download directory can be created
        std::fs::create_dir_all(&self.download_dir).with_context(|| {
            format!(
                "Cannot create download directory: {}",
                self.download_dir.display()
            )
        })?;

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.download_dir_str(), "./downloads");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.http.timeout_seconds, 30);
    }

    #[test]
    fn test_config_validation() {
        let config = Config::from_env().unwrap();
        // Should not fail for default paths
        config.validate().unwrap();
    }

    #[test]
    fn test_config_rejects_zero_page_size() {
        let mut config = Config::from_env().unwrap();
        config.page_size = 0;
        assert!(config.validate().is_err());
    }
}
