use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::extract::ApiJson;
use super::AppState;
use crate::chatbot;
use crate::error::ApiError;
use crate::models::Lead;
use crate::records::Repository;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/chatbot", post(chat))
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    context: Option<Map<String, Value>>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: &'static str,
    timestamp: DateTime<Utc>,
}

async fn chat(
    State(repo): State<Repository>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let outcome = chatbot::respond(&request.message, request.context.as_ref());
    debug!(rule = outcome.rule, "Chatbot reply selected");

    if let Some(fields) = outcome.lead {
        let lead = repo.create::<Lead>(fields).await?;
        info!("💬 Captured chatbot lead {}", lead.id);
    }

    Ok(Json(ChatResponse {
        response: outcome.response,
        timestamp: Utc::now(),
    }))
}
