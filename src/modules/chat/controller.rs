use axum::{extract::rejection::JsonRejection, extract::State, Json};
use validator::Validate;

use crate::modules::chat::{
    error::ChatError,
    model::start_chat,
    schema::{ChatRequest, ChatResponse},
};
use crate::AppState;

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(payload) = match payload {
        Ok(payload) => {
            tracing::info!(user_input = %payload.user_input, "Incoming /chat request");
            payload
        }
        Err(rejection) => {
            tracing::info!(reason = %rejection, "Incoming /chat request with unreadable body");
            return Err(ChatError::InvalidRequest);
        }
    };

    if payload.validate().is_err() {
        return Err(ChatError::InvalidRequest);
    }

    let session = start_chat();

    let response = session
        .send_message(state.llm.as_ref(), &payload.user_input)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error in chat endpoint");
            ChatError::UpstreamFailure(e)
        })?;

    Ok(Json(ChatResponse { response }))
}
