//! Single-shot HTTP calls bounded by a timeout.
//!
//! Every call returns the response head together with the body decoded as
//! JSON, or `None` when the body is not valid JSON for the requested type.
//! The timer lives inside `tokio::time::timeout`, so it is released on every
//! exit path and dropping the request future cancels the call.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, header::HeaderMap};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::FetchError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// What is left of a response once its body has been read.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseHead {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

pub type Fetched<T> = (ResponseHead, Option<T>);

/// GETs `url` and decodes the body as `T`.
pub async fn get_data<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<Fetched<T>, FetchError> {
    send_timed(client.get(url), timeout).await
}

/// POSTs `data` as JSON to `url` and decodes the body as `T`.
pub async fn post_data<B: Serialize + ?Sized, T: DeserializeOwned>(
    client: &Client,
    url: &str,
    data: &B,
    timeout: Duration,
) -> Result<Fetched<T>, FetchError> {
    send_timed(client.post(url).json(data), timeout).await
}

async fn send_timed<T: DeserializeOwned>(
    request: RequestBuilder,
    timeout: Duration,
) -> Result<Fetched<T>, FetchError> {
    with_timeout(timeout, async move {
        let res = request.send().await?;
        let head = ResponseHead {
            status: res.status(),
            headers: res.headers().clone(),
        };
        let bytes = res.bytes().await?;
        let data = match serde_json::from_slice::<T>(&bytes) {
            Ok(data) => Some(data),
            Err(e) => {
                debug!(status = %head.status, error = %e, "response body is not the expected JSON");
                None
            }
        };
        Ok((head, data))
    })
    .await
}

/// Races `fut` against a timer of `timeout`.
///
/// Whichever finishes first decides the outcome; the loser is dropped.
pub async fn with_timeout<F, T>(timeout: Duration, fut: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(?timeout, "request aborted by timeout");
            Err(FetchError::Aborted { timeout })
        }
    }
}
