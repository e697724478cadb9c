//! Chat and health endpoints

use std::convert::Infallible;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::Json;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::domain::{invoke_stream, ChatInput, ConversationTurn, InvocationResult};
use crate::AppContext;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Single user message (legacy format)
    #[serde(default)]
    pub message: Option<String>,
    /// Full conversation history
    #[serde(default)]
    pub messages: Option<Vec<ConversationTurn>>,
    #[serde(default)]
    pub session_id: Option<String>,
}

type ApiError = (StatusCode, Json<Value>);

fn bad_request(detail: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail })))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "edgelink",
        "version": env!("CARGO_PKG_VERSION"),
        "auth_mode": "fully-dynamic",
        "caching": "disabled",
    }))
}

/// `POST /chat`. Input violations are a 400; everything downstream of
/// validation comes back as HTTP 200 with the success flag set.
pub async fn chat(
    State(ctx): State<AppContext>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<InvocationResult>, ApiError> {
    let input = ChatInput::from_parts(request.message, request.messages).map_err(|e| {
        warn!(error = %e, "rejecting chat request");
        bad_request(e.to_string())
    })?;

    Ok(Json(ctx.agent.invoke(input, request.session_id).await))
}

/// `POST /chat/stream`: SSE carrying exactly one event with the
/// complete result.
pub async fn chat_stream(
    State(ctx): State<AppContext>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let input = ChatInput::from_parts(request.message, request.messages).map_err(|e| {
        warn!(error = %e, "rejecting streaming chat request");
        bad_request(e.to_string())
    })?;

    let events = invoke_stream(ctx.agent.clone(), input, request.session_id).map(|event| {
        Ok(Event::default()
            .json_data(&event)
            .unwrap_or_else(|_| Event::default().data("{}")))
    });

    Ok(Sse::new(events))
}
