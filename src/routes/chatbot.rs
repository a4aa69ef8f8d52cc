//! AI chatbot proxy

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::AppState;
use crate::constants::{CHATBOT_APOLOGY, WEBSITE_CONTEXT};
use crate::services::error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chatBot/chat", post(chat))
}

#[derive(Deserialize)]
struct ChatRequest {
    prompt: Option<String>,
}

/// POST /chatBot/chat - forward the prompt to the model with the site
/// context prepended. Upstream failures are logged and surfaced as an
/// apology rather than a raw provider error.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let prompt = req.prompt.as_deref().map(str::trim).unwrap_or("");
    if prompt.is_empty() {
        return Err(ApiError::bad_request("Prompt is required"));
    }

    match state.gemini.generate(WEBSITE_CONTEXT, prompt).await {
        Ok(text) => Ok(Json(json!({ "success": true, "response": text }))),
        Err(err) => {
            eprintln!("Chatbot error: {:?}", err);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                CHATBOT_APOLOGY,
            ))
        }
    }
}
