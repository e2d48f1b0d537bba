use axum::{
    routing::{get, post},
    Router,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tower_http::cors::{CorsLayer, Any};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::extract::ValidatedUrl;
use crate::api::models::TEST_ANALYSIS;
use crate::api::response;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    // `GET /` resolves to `index.html` inside the static directory.
    let static_files = ServeDir::new(&app_state.config.static_dir);

    Router::new()
        .route("/analyze-sentiment", post(analyze_handler))
        .route("/test/analyze-sentiment", post(test_analyze_handler))
        .route("/health", get(health_handler))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn analyze_handler(
    State(state): State<AppState>,
    ValidatedUrl(url): ValidatedUrl,
) -> Response {
    info!(url = %url, "Processing analyze request");
    let start_time = std::time::Instant::now();

    let result = state.analyzer.analyze(&url).await;

    let elapsed = start_time.elapsed();
    match result {
        Ok(analysis) => {
            info!(url = %url, ?elapsed, polarity = %analysis.polarity, "Analysis succeeded");
            response::success(analysis).into_response()
        }
        Err(err) => {
            warn!(url = %url, ?elapsed, status = %err.status(), "Analysis failed");
            err.into_response()
        }
    }
}

async fn test_analyze_handler(ValidatedUrl(url): ValidatedUrl) -> Response {
    info!(url = %url, "Serving canned analysis");
    response::success(TEST_ANALYSIS.clone()).into_response()
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
