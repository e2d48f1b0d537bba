use axum::http::{HeaderMap, header::CONTENT_TYPE};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::api::response::FieldError;
use crate::sentiment::SentimentAnalysis;
use crate::url_checker::is_valid_url;

/// Body of `POST /analyze-sentiment`, as JSON or as a urlencoded form.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Analysis served by the test endpoint without contacting the upstream API.
pub static TEST_ANALYSIS: Lazy<SentimentAnalysis> = Lazy::new(|| SentimentAnalysis {
    polarity: "positive".to_string(),
    agreement: "agreement".to_string(),
    subjectivity: "objective".to_string(),
    confidence: 42,
    irony: "ironic".to_string(),
    snippet: "What do you get if you multiply six by nine?".to_string(),
});

impl AnalyzeRequest {
    /// Decodes the body according to its content type. Unreadable bodies decode
    /// to an empty request, which then fails validation.
    pub fn from_body(headers: &HeaderMap, body: &[u8]) -> Self {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let parsed = if content_type.starts_with("application/x-www-form-urlencoded") {
            serde_urlencoded::from_bytes::<AnalyzeRequest>(body).ok()
        } else {
            serde_json::from_slice::<AnalyzeRequest>(body).ok()
        };
        parsed.unwrap_or_default()
    }

    /// Returns the URL when it is an absolute `http`/`https` URL.
    pub fn validate(self) -> Result<String, Vec<FieldError>> {
        match self.url {
            Some(url) if is_valid_url(&url) => Ok(url),
            value => Err(vec![FieldError {
                kind: "field".to_string(),
                value,
                msg: "must be a valid URL".to_string(),
                path: "url".to_string(),
                location: "body".to_string(),
            }]),
        }
    }
}
