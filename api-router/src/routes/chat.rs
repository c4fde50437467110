use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{api_state::ApiState, error::ApiError};

#[derive(Deserialize, Debug)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse {
    pub reply: String,
}

/// Answers one question. Upstream failures are part of the reply, not an error status.
pub async fn chat(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let question = request.message.trim();
    if question.is_empty() {
        return Err(ApiError::ValidationError(
            "message must not be empty".to_string(),
        ));
    }

    let reply = state.assistant.answer(question).await;
    Ok(Json(ChatResponse { reply }))
}
