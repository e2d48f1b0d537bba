//! Submission flow of the client form.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use sentiment_proxy::api::routes::create_router;
use sentiment_proxy::client::{
    FAILURE_ALERT, FormState, INVALID_URL_ALERT, RETRY_HINT, ResultFields, ResultView,
    SubmissionForm, SubmitOutcome,
};
use sentiment_proxy::AppState;

mod common;

const CANNED_ANALYSIS: &str = r#"{
    "polarity": "positive",
    "agreement": "agreement",
    "subjectivity": "objective",
    "confidence": 42,
    "irony": "ironic",
    "snippet": "What do you get if you multiply six by nine?"
}"#;

#[derive(Default)]
struct FakeView {
    target_url: String,
    alerts: Mutex<Vec<String>>,
    toggles: Mutex<Vec<bool>>,
    rendered: Mutex<Option<ResultFields>>,
}

impl FakeView {
    fn new(target_url: &str) -> Self {
        Self { target_url: target_url.to_string(), ..Default::default() }
    }

    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    fn toggles(&self) -> Vec<bool> {
        self.toggles.lock().unwrap().clone()
    }

    fn rendered(&self) -> Option<ResultFields> {
        self.rendered.lock().unwrap().clone()
    }
}

impl ResultView for FakeView {
    fn target_url(&self) -> String {
        self.target_url.clone()
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.toggles.lock().unwrap().push(enabled);
    }

    fn render(&self, fields: &ResultFields) {
        *self.rendered.lock().unwrap() = Some(fields.clone());
    }
}

fn canned_fields() -> ResultFields {
    ResultFields {
        snippet: "What do you get if you multiply six by nine?".to_string(),
        polarity: "positive".to_string(),
        agreement: "agreement".to_string(),
        subjectivity: "objective".to_string(),
        confidence: "42%".to_string(),
        irony: "ironic".to_string(),
    }
}

fn form_for(endpoint: String) -> SubmissionForm {
    SubmissionForm::with_client(Client::new(), endpoint, Duration::from_secs(5))
}

#[tokio::test]
async fn invalid_url_alerts_without_network_call() {
    let backend = common::start_mock_backend(200, CANNED_ANALYSIS).await;
    let form = form_for(backend.url("/analyze-sentiment"));
    let view = FakeView::new("example.com");

    let outcome = form.submit(&view).await;

    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert_eq!(view.alerts(), vec![INVALID_URL_ALERT.to_string()]);
    assert!(view.toggles().is_empty());
    assert!(view.rendered().is_none());
    assert_eq!(form.state(), FormState::Idle);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn valid_url_renders_all_fields() {
    let backend = common::start_mock_backend(200, CANNED_ANALYSIS).await;
    let form = form_for(backend.url("/analyze-sentiment"));
    let view = FakeView::new("https://example.com/article");

    let outcome = form.submit(&view).await;

    assert_eq!(outcome, SubmitOutcome::Succeeded(canned_fields()));
    assert_eq!(view.rendered(), Some(canned_fields()));
    assert!(view.alerts().is_empty());
    assert_eq!(view.toggles(), vec![false, true]);
    assert_eq!(form.state(), FormState::Succeeded);
    assert!(!form.is_busy());
}

#[tokio::test]
async fn service_unavailable_adds_retry_hint() {
    let backend = common::start_mock_backend(503, r#"{"message":"Failed to analyze page."}"#).await;
    let form = form_for(backend.url("/analyze-sentiment"));
    let view = FakeView::new("https://example.com/");

    let outcome = form.submit(&view).await;

    assert_eq!(outcome, SubmitOutcome::Failed { status: Some(StatusCode::SERVICE_UNAVAILABLE) });
    assert_eq!(view.alerts(), vec![format!("{} {}", FAILURE_ALERT, RETRY_HINT)]);
    assert_eq!(view.toggles(), vec![false, true]);
    assert_eq!(form.state(), FormState::Failed);
}

#[tokio::test]
async fn other_failures_show_generic_alert() {
    let backend = common::start_mock_backend(200, "not valid JSON").await;
    let form = form_for(backend.url("/analyze-sentiment"));
    let view = FakeView::new("https://example.com/");

    let outcome = form.submit(&view).await;

    assert_eq!(outcome, SubmitOutcome::Failed { status: Some(StatusCode::OK) });
    assert_eq!(view.alerts(), vec![FAILURE_ALERT.to_string()]);
    assert!(view.rendered().is_none());
}

#[tokio::test]
async fn timeout_fails_and_reenables_submit() {
    let backend = common::start_programmable_backend(|_| async {
        common::MockResponse::new(200, CANNED_ANALYSIS).delayed(Duration::from_secs(5))
    })
    .await;
    let form = SubmissionForm::with_client(
        Client::new(),
        backend.url("/analyze-sentiment"),
        Duration::from_millis(200),
    );
    let view = FakeView::new("https://example.com/");

    let outcome = form.submit(&view).await;

    assert_eq!(outcome, SubmitOutcome::Failed { status: None });
    assert_eq!(view.alerts(), vec![FAILURE_ALERT.to_string()]);
    assert_eq!(view.toggles(), vec![false, true]);
    assert!(!form.is_busy());
}

#[tokio::test]
async fn second_submission_is_rejected_while_in_flight() {
    let backend = common::start_programmable_backend(|_| async {
        common::MockResponse::new(200, CANNED_ANALYSIS).delayed(Duration::from_millis(300))
    })
    .await;
    let form = form_for(backend.url("/analyze-sentiment"));
    let first = FakeView::new("https://example.com/one");
    let second = FakeView::new("https://example.com/two");

    let (a, b) = tokio::join!(form.submit(&first), form.submit(&second));

    assert_eq!(a, SubmitOutcome::Succeeded(canned_fields()));
    assert_eq!(b, SubmitOutcome::Busy);
    assert!(second.toggles().is_empty());
    assert_eq!(backend.hits(), 1);

    // Once the first one is done, the form accepts submissions again.
    let third = FakeView::new("https://example.com/three");
    assert_eq!(form.submit(&third).await, SubmitOutcome::Succeeded(canned_fields()));
}

#[tokio::test]
async fn end_to_end_against_test_endpoint() {
    let addr = common::closed_addr().await;
    let state = AppState::new(common::test_config(&format!("http://{}/", addr), 2_000)).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, create_router(state)).await;
    });

    let form = form_for(format!("http://{}/test/analyze-sentiment", server_addr));
    let view = FakeView::new("http://example.com/index.html#fragment");

    let outcome = form.submit(&view).await;

    assert_eq!(outcome, SubmitOutcome::Succeeded(canned_fields()));
    assert_eq!(view.rendered(), Some(canned_fields()));
}
