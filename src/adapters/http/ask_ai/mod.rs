//! HTTP adapter for the ask-AI endpoints, mounted at `/api/ask-ai`.
//!
//! - `POST /ask` - Answer a question
//! - `GET /health` - Module readiness

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::handlers::AskAiCommand;

use super::error::ApiError;
use super::state::AppState;

const MODULE_NAME: &str = "askAI";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskRequest {
    /// Kept loose so a non-string question gets the usual message.
    pub question: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub model: String,
    pub usage: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskAiHealth {
    pub status: &'static str,
    pub module: &'static str,
    pub ready: bool,
}

/// POST /api/ask-ai/ask
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let question = match request.question {
        Some(Value::String(q)) => q,
        _ => return Err(ApiError::bad_request("question is required")),
    };

    let answer = state
        .ask_ai_handler()
        .handle(AskAiCommand { question })
        .await?;

    Ok(Json(AskResponse {
        answer: answer.answer,
        model: answer.model,
        usage: answer.usage,
    }))
}

/// GET /api/ask-ai/health
pub async fn health(State(state): State<AppState>) -> Json<AskAiHealth> {
    Json(AskAiHealth {
        status: "ok",
        module: MODULE_NAME,
        ready: state.ask_ai_handler().is_ready(),
    })
}

pub fn ask_ai_routes() -> Router<AppState> {
    Router::new()
        .route("/ask", post(ask))
        .route("/health", get(health))
}
