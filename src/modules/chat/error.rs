use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::modules::chat::schema::ErrorResponse;
use crate::services::llm::LlmError;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Invalid request body")]
    InvalidRequest,
    #[error("Upstream failure: {0}")]
    UpstreamFailure(#[from] LlmError),
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        // Upstream detail stays in the server log.
        let (status, message) = match self {
            ChatError::InvalidRequest => (StatusCode::BAD_REQUEST, "Invalid request body"),
            ChatError::UpstreamFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
