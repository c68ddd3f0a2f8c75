use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotApiError>;

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Error)]
pub enum BotApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Failed to read transcript: {0}")]
    Transcript(#[from] huddle_transcript::Error),

    #[error("Failed to launch session: {0}")]
    Launch(String),
}

impl IntoResponse for BotApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, "bad_request", message),
            Self::Transcript(err) => {
                let message = err.to_string();
                tracing::error!(error = %message, "transcript_read_failed");
                sentry::capture_message(&message, sentry::Level::Error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "transcript_read_failed",
                    "Failed to read transcript file".to_string(),
                )
            }
            Self::Launch(message) => {
                tracing::error!(error = %message, "session_launch_failed");
                sentry::capture_message(&message, sentry::Level::Error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "session_launch_failed",
                    "Failed to launch session".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetails {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}
