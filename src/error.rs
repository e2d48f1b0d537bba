use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use std::time::Duration;

use crate::api::response;

/// Startup and configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure of a single timed network call.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("The operation was aborted after {timeout:?}")]
    Aborted { timeout: Duration },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    pub fn is_abort(&self) -> bool {
        matches!(self, FetchError::Aborted { .. })
    }
}

const HINT_TOO_LARGE: &str = "Hint: The page is probably too large.";
const HINT_NO_CONTENT: &str = "Hint: Make sure that the URL is valid and that the page is public.";

/// An upstream analysis failure, already classified into the status we answer with.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Failed to analyze page at URL='{url}'. {}", HINT_TOO_LARGE)]
    RequestTooLarge { url: String },

    #[error("Failed to analyze page at URL='{url}'. {}", HINT_NO_CONTENT)]
    NoContent { url: String },

    #[error("Failed to analyze page at URL='{url}'.")]
    UpstreamTimeout { url: String },

    #[error("Failed to analyze page at URL='{url}'.")]
    UpstreamUnavailable { url: String },

    #[error("Failed to analyze page at URL='{url}'.")]
    UpstreamProtocol { url: String },

    #[error("Failed to analyze page at URL='{url}'.")]
    Transport { url: String },
}

impl AnalyzeError {
    pub fn status(&self) -> StatusCode {
        match self {
            AnalyzeError::RequestTooLarge { .. } | AnalyzeError::NoContent { .. } => {
                StatusCode::BAD_REQUEST
            }
            AnalyzeError::UpstreamTimeout { .. } | AnalyzeError::UpstreamUnavailable { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AnalyzeError::UpstreamProtocol { .. } | AnalyzeError::Transport { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        response::error(self.status(), self.to_string()).into_response()
    }
}

/// Failures surfaced to the submitting client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(reqwest::Error),
}
