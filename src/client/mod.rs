//! Client side of the analysis: validate the URL, submit it to the proxy and
//! render the result through a [`ResultView`].

pub mod view;

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ClientError;
use crate::http_client::{DEFAULT_TIMEOUT, post_data};
use crate::sentiment::SentimentAnalysis;
use crate::url_checker::is_valid_url;

pub use view::{ResultFields, ResultView, TerminalView};

pub const ABOUT: &str = "Front End Web Developer Udacity Nanodegree 2023-2024 - \
                         Course 4 Project: Evaluate a News Article with NLP";
pub const INVALID_URL_ALERT: &str = "Please, enter a valid URL and try again.";
pub const FAILURE_ALERT: &str = "Failed to analyze the page.";
pub const RETRY_HINT: &str = "Please, try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    Invalid,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The URL was rejected; nothing was sent.
    Invalid,
    /// A submission is already in flight; nothing was sent.
    Busy,
    Succeeded(ResultFields),
    /// `status` is `None` when no response was received at all.
    Failed { status: Option<StatusCode> },
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    url: &'a str,
}

/// A form posting URLs to an analyze-sentiment endpoint, one at a time.
pub struct SubmissionForm {
    http: Client,
    endpoint: String,
    timeout: Duration,
    busy: AtomicBool,
    state: Mutex<FormState>,
}

impl SubmissionForm {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().build().map_err(ClientError::Build)?;
        Ok(Self::with_client(http, endpoint, DEFAULT_TIMEOUT))
    }

    pub fn with_client(http: Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            timeout,
            busy: AtomicBool::new(false),
            state: Mutex::new(FormState::Idle),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> FormState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn set_state(&self, state: FormState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Handles one submit event.
    pub async fn submit<V: ResultView + ?Sized>(&self, view: &V) -> SubmitOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("submission ignored, another one is in flight");
            return SubmitOutcome::Busy;
        }
        let _guard = InFlight { form: self };

        self.set_state(FormState::Validating);
        let target_url = view.target_url();
        if !is_valid_url(&target_url) {
            self.set_state(FormState::Invalid);
            view.alert(INVALID_URL_ALERT);
            self.set_state(FormState::Idle);
            return SubmitOutcome::Invalid;
        }

        self.set_state(FormState::Submitting);
        view.set_submit_enabled(false);
        let outcome = self.send(&target_url).await;
        view.set_submit_enabled(true);

        match &outcome {
            SubmitOutcome::Succeeded(fields) => {
                self.set_state(FormState::Succeeded);
                view.render(fields);
            }
            SubmitOutcome::Failed { status } => {
                self.set_state(FormState::Failed);
                if *status == Some(StatusCode::SERVICE_UNAVAILABLE) {
                    view.alert(&format!("{} {}", FAILURE_ALERT, RETRY_HINT));
                } else {
                    view.alert(FAILURE_ALERT);
                }
            }
            SubmitOutcome::Invalid | SubmitOutcome::Busy => {}
        }
        outcome
    }

    async fn send(&self, target_url: &str) -> SubmitOutcome {
        let body = SubmitBody { url: target_url };
        match post_data::<_, SentimentAnalysis>(&self.http, &self.endpoint, &body, self.timeout).await {
            Ok((head, Some(analysis))) if head.is_success() => {
                info!(url = target_url, "analysis received");
                SubmitOutcome::Succeeded(ResultFields::from(&analysis))
            }
            Ok((head, _)) => {
                warn!(url = target_url, status = %head.status, "analysis failed");
                SubmitOutcome::Failed { status: Some(head.status) }
            }
            Err(e) => {
                warn!(url = target_url, error = %e, "analysis request failed");
                SubmitOutcome::Failed { status: None }
            }
        }
    }
}

// Clears the busy flag however `submit` returns, including when its future is dropped.
struct InFlight<'a> {
    form: &'a SubmissionForm,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.form.busy.store(false, Ordering::Release);
    }
}
