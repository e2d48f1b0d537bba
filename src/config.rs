use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;
use crate::error::{AppError, Result};
use crate::http_client::DEFAULT_TIMEOUT;
use crate::sentiment::DEFAULT_SNIPPET_LENGTH;

pub const DEFAULT_SENTIMENT_API_BASE_URL: &str = "https://api.meaningcloud.com/sentiment-2.1";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub meaning_cloud_api_key: String,
    pub sentiment_api_base_url: Url,
    pub upstream_timeout: Duration,
    pub snippet_length: usize,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let meaning_cloud_api_key = lookup("MEANING_CLOUD_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::ConfigError(
                    "Environment variable 'MEANING_CLOUD_API_KEY' is not set or empty".to_string(),
                )
            })?;

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let base_url = lookup("SENTIMENT_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_SENTIMENT_API_BASE_URL.to_string());
        let sentiment_api_base_url = Url::parse(&base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid SENTIMENT_API_BASE_URL: {}", e)))?;

        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_MS") {
            Some(ms) => {
                let ms = ms
                    .parse::<u64>()
                    .map_err(|e| AppError::ConfigError(format!("Invalid UPSTREAM_TIMEOUT_MS: {}", e)))?;
                if ms == 0 {
                    return Err(AppError::ConfigError("UPSTREAM_TIMEOUT_MS must be positive".to_string()));
                }
                Duration::from_millis(ms)
            }
            None => DEFAULT_TIMEOUT,
        };

        let snippet_length = match lookup("SNIPPET_LENGTH") {
            Some(len) => len
                .parse::<usize>()
                .map_err(|e| AppError::ConfigError(format!("Invalid SNIPPET_LENGTH: {}", e)))?,
            None => DEFAULT_SNIPPET_LENGTH,
        };

        let static_dir = PathBuf::from(lookup("STATIC_DIR").unwrap_or_else(|| "dist".to_string()));

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            meaning_cloud_api_key,
            sentiment_api_base_url,
            upstream_timeout,
            snippet_length,
            static_dir,
        })
    }
}
