pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http_client;
pub mod sentiment;
pub mod url_checker;

use std::sync::Arc;
use config::Config;
use sentiment::SentimentClient;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: Arc<SentimentClient>,
}

impl AppState {
    pub fn new(config: Config) -> error::Result<Self> {
        let analyzer = SentimentClient::new(&config)?;
        Ok(AppState {
            config: Arc::new(config),
            analyzer: Arc::new(analyzer),
        })
    }
}
