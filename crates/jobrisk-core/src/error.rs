use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const MISSING_JOB_TITLE: &str = "Missing job_title";

/// Request-level failures. Rendered as a flat `{"error": "..."}` body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("model call failed: {0}")]
    ExternalCall(String),

    #[error("model returned malformed output: {0}")]
    MalformedModelOutput(String),
}

impl AppError {
    pub fn missing_job_title() -> Self {
        AppError::Validation(MISSING_JOB_TITLE.to_owned())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalCall(_) | AppError::MalformedModelOutput(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "check_job failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
