//! MeaningCloud Sentiment Analysis API, version 2.1.
//!
//! See <https://learn.meaningcloud.com/developer/sentiment-analysis/2.1/doc> for the
//! payload and <https://www.meaningcloud.com/developer/documentation/error-codes> for
//! the API status codes.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{AnalyzeError, AppError, Result};
use crate::http_client::get_data;

pub const DEFAULT_SNIPPET_LENGTH: usize = 200;

/// Result of a sentiment analysis, as returned to our own clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub polarity: String,
    pub agreement: String,
    pub subjectivity: String,
    pub confidence: i64,
    pub irony: String,
    pub snippet: String,
}

/// Raw upstream payload. Only the fields we consume are modelled.
///
/// Every field is decoded on its own: a value of the wrong type reads as
/// absent instead of failing the whole payload, so `status.code` survives
/// whatever else the API sends.
#[derive(Debug, Default, Deserialize)]
pub struct ApiPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<ApiStatus>,
    #[serde(default, deserialize_with = "lenient")]
    pub score_tag: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub agreement: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub subjectivity: Option<String>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub confidence: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub irony: Option<String>,
    #[serde(default, deserialize_with = "lenient_sentences")]
    pub sentence_list: Option<Vec<Sentence>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub msg: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Sentence {
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

// Null or malformed entries are skipped; a missing or non-array list reads as absent.
fn lenient_sentences<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<Sentence>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| Sentence::deserialize(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

// The API sends numbers as strings ("100"); accept both forms.
fn lenient_integer<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    })
}

/// API status code carried in `status.code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCode {
    Ok,
    RequestTooLarge,
    EngineInternalError,
    CannotConnect,
    NoContent,
    Other(String),
}

impl From<&str> for ApiCode {
    fn from(code: &str) -> Self {
        match code {
            "0" => ApiCode::Ok,
            "103" => ApiCode::RequestTooLarge,
            "202" => ApiCode::EngineInternalError,
            "203" => ApiCode::CannotConnect,
            "212" => ApiCode::NoContent,
            other => ApiCode::Other(other.to_string()),
        }
    }
}

/// Global polarity of the analyzed text, keyed by the API's `score_tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    VeryNegative,
    NoPolarity,
    Unknown,
}

impl Polarity {
    pub fn from_score_tag(tag: &str) -> Self {
        match tag {
            "P+" => Polarity::VeryPositive,
            "P" => Polarity::Positive,
            "NEU" => Polarity::Neutral,
            "N" => Polarity::Negative,
            "N+" => Polarity::VeryNegative,
            "NONE" => Polarity::NoPolarity,
            _ => Polarity::Unknown,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Polarity::VeryPositive => "very positive",
            Polarity::Positive => "positive",
            Polarity::Neutral => "neutral",
            Polarity::Negative => "negative",
            Polarity::VeryNegative => "very negative",
            Polarity::NoPolarity => "without polarity",
            Polarity::Unknown => "n/a",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Builds the analysis request URL for `page_url`.
pub fn request_url(base: &Url, api_key: &str, page_url: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("key", api_key)
        // Detect the language, answer in English.
        .append_pair("lang", "auto")
        .append_pair("ilang", "en")
        .append_pair("url", page_url);
    url
}

fn redact_key(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}

/// Joins trimmed, non-empty sentences with `separator` until their cumulated
/// length reaches `stop_length`. Sentences are never cut.
pub fn snippet(sentences: &[Sentence], stop_length: usize, separator: &str) -> String {
    let mut buffer: Vec<&str> = Vec::new();
    let mut cum_len = 0;
    for text in sentences.iter().filter_map(|s| s.text.as_deref()) {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        buffer.push(text);
        cum_len += text.chars().count();
        if cum_len >= stop_length {
            break;
        }
    }
    buffer.join(separator)
}

/// Maps the upstream HTTP status and decoded payload to our outcome.
pub fn normalize(
    page_url: &str,
    status: StatusCode,
    payload: Option<ApiPayload>,
    snippet_length: usize,
) -> std::result::Result<SentimentAnalysis, AnalyzeError> {
    let url = page_url.to_string();
    if !status.is_success() {
        return Err(if status == StatusCode::SERVICE_UNAVAILABLE {
            AnalyzeError::UpstreamUnavailable { url }
        } else {
            AnalyzeError::UpstreamProtocol { url }
        });
    }
    match payload {
        Some(payload) => check_response(page_url, &payload, snippet_length),
        None => Err(AnalyzeError::UpstreamProtocol { url }),
    }
}

/// Maps the API status code of a decoded payload to our outcome.
pub fn check_response(
    page_url: &str,
    payload: &ApiPayload,
    snippet_length: usize,
) -> std::result::Result<SentimentAnalysis, AnalyzeError> {
    let url = page_url.to_string();
    let code = payload
        .status
        .as_ref()
        .and_then(|s| s.code.as_deref())
        .unwrap_or("");

    match ApiCode::from(code) {
        ApiCode::Ok => build_analysis(payload, snippet_length)
            .ok_or(AnalyzeError::UpstreamProtocol { url }),
        ApiCode::RequestTooLarge => Err(AnalyzeError::RequestTooLarge { url }),
        ApiCode::EngineInternalError | ApiCode::CannotConnect => {
            Err(AnalyzeError::UpstreamUnavailable { url })
        }
        ApiCode::NoContent => Err(AnalyzeError::NoContent { url }),
        ApiCode::Other(code) => {
            let msg = payload.status.as_ref().and_then(|s| s.msg.as_deref()).unwrap_or("");
            warn!(code = %code, msg, "unexpected API status code");
            Err(AnalyzeError::UpstreamProtocol { url })
        }
    }
}

fn build_analysis(payload: &ApiPayload, snippet_length: usize) -> Option<SentimentAnalysis> {
    let polarity = payload
        .score_tag
        .as_deref()
        .map(Polarity::from_score_tag)
        .unwrap_or(Polarity::Unknown);

    Some(SentimentAnalysis {
        polarity: polarity.description().to_string(),
        agreement: payload.agreement.as_ref()?.to_lowercase(),
        subjectivity: payload.subjectivity.as_ref()?.to_lowercase(),
        confidence: payload.confidence?,
        irony: payload.irony.as_ref()?.to_lowercase(),
        snippet: snippet(payload.sentence_list.as_deref()?, snippet_length, " "),
    })
}

/// Client for the analysis API, configured once at startup.
#[derive(Debug, Clone)]
pub struct SentimentClient {
    http: Client,
    base_url: Url,
    api_key: String,
    timeout: Duration,
    snippet_length: usize,
}

impl SentimentClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = ClientBuilder::new()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.sentiment_api_base_url.clone(),
            api_key: config.meaning_cloud_api_key.clone(),
            timeout: config.upstream_timeout,
            snippet_length: config.snippet_length,
        })
    }

    /// Runs a sentiment analysis of the page at `page_url`.
    pub async fn analyze(&self, page_url: &str) -> std::result::Result<SentimentAnalysis, AnalyzeError> {
        let req_url = request_url(&self.base_url, &self.api_key, page_url);
        info!(request = %redact_key(&req_url), "requesting sentiment analysis");

        match get_data::<ApiPayload>(&self.http, req_url.as_str(), self.timeout).await {
            Ok((head, payload)) => {
                debug!(status = %head.status, parsed = payload.is_some(), "upstream answered");
                normalize(page_url, head.status, payload, self.snippet_length)
            }
            Err(e) => {
                warn!(error = %e, "upstream call failed");
                let url = page_url.to_string();
                if e.is_abort() {
                    Err(AnalyzeError::UpstreamTimeout { url })
                } else {
                    Err(AnalyzeError::Transport { url })
                }
            }
        }
    }
}
