use std::{any::Any, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    analytics::AnalyticsLog,
    assessor::RiskAssessor,
    error::AppError,
    types::{AnalyticsRecord, JobRiskAssessment},
};

static INDEX_HTML: &str = include_str!("index.html");
static PREVIEW_HTML: &str = include_str!("preview.html");

#[derive(Clone)]
pub struct AppState {
    pub assessor: Arc<dyn RiskAssessor>,
    pub analytics: AnalyticsLog,
}

#[derive(Debug, Deserialize)]
pub struct CheckJobRequest {
    #[serde(default)]
    pub job_title: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/preview/{job}", get(preview))
        .route("/check_job", post(check_job))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

async fn preview(Path(job): Path<String>) -> Html<String> {
    Html(render_preview(&job))
}

async fn check_job(
    State(state): State<AppState>,
    payload: Result<Json<CheckJobRequest>, JsonRejection>,
) -> Result<Json<JobRiskAssessment>, AppError> {
    let job_title = payload
        .ok()
        .and_then(|Json(request)| request.job_title)
        .map(|title| title.trim().to_owned())
        .filter(|title| !title.is_empty())
        .ok_or_else(AppError::missing_job_title)?;

    let assessment = state.assessor.assess(&job_title).await?;
    state
        .analytics
        .record(&AnalyticsRecord::from_assessment(&job_title, &assessment))
        .await;

    Ok(Json(assessment))
}

fn render_preview(job: &str) -> String {
    let job = job.trim();
    let label = if job.is_empty() { "your job" } else { job };
    PREVIEW_HTML.replace("{{job}}", &html_escape(label))
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(detail, "request handler panicked");

    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
