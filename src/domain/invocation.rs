//! Invocation results, tool handles and reasoning-loop output shapes

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::conversation::TextSegment;
use super::{ServerKey, ToolInvoker};
use crate::error::GatewayResult;

/// A tool discovered on an MCP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name as advertised by the server
    pub name: String,
    /// Tool description
    #[serde(default)]
    pub description: String,
    /// Parameter names from the input schema's properties, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<String>>,
}

/// A tool bound to the open session that can invoke it
#[derive(Clone)]
pub struct AgentTool {
    /// Server the tool lives on
    pub server: ServerKey,
    /// Discovered tool metadata
    pub descriptor: ToolDescriptor,
    /// Session-backed invoker for this tool
    pub invoker: Arc<dyn ToolInvoker>,
}

impl AgentTool {
    /// Invoke the tool through its backing session
    pub async fn call(&self, arguments: Option<serde_json::Map<String, Value>>) -> GatewayResult<String> {
        self.invoker.invoke_tool(&self.descriptor.name, arguments).await
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("server", &self.server)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// Final outcome of an agent invocation, as returned to the caller.
///
/// Constructed only through `success`/`failure` so the `success` flag,
/// `response` text and `error` detail always agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResult {
    /// Agent response text (or the error envelope on failure)
    pub response: String,
    /// Session correlation id (pass-through or synthesized)
    pub session_id: String,
    /// Whether the invocation succeeded
    pub success: bool,
    /// Error detail when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InvocationResult {
    /// Successful invocation
    pub fn success(response: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            session_id: session_id.into(),
            success: true,
            error: None,
        }
    }

    /// Failed invocation; wraps the detail in the standard error envelope
    pub fn failure(detail: impl Into<String>, session_id: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            response: format!("Error invoking agent: {detail}"),
            session_id: session_id.into(),
            success: false,
            error: Some(detail),
        }
    }
}

/// The shapes a reasoning loop may return its final answer in
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LoopOutput {
    /// `{"content": [{"text": ...}, ...]}` with at least one part; an
    /// empty array falls through to `Other`
    Content {
        #[serde(deserialize_with = "non_empty_segments")]
        content: Vec<TextSegment>,
    },
    /// `{"message": ...}`
    Message { message: String },
    /// `{"response": ...}`
    Response { response: String },
    /// `{"output": ...}`
    Output { output: String },
    /// `{"text": ...}`
    Plain { text: String },
    /// Bare string
    Text(String),
    /// Anything else, passed through as JSON
    Other(Value),
}

fn non_empty_segments<'de, D>(deserializer: D) -> Result<Vec<TextSegment>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let segments = Vec::<TextSegment>::deserialize(deserializer)?;
    if segments.is_empty() {
        return Err(serde::de::Error::custom("content must not be empty"));
    }
    Ok(segments)
}

impl LoopOutput {
    /// Normalize to plain text. The single extraction point for all shapes.
    pub fn into_text(self) -> String {
        match self {
            LoopOutput::Content { content } => content
                .into_iter()
                .next()
                .map(|segment| segment.text)
                .unwrap_or_default(),
            LoopOutput::Message { message } => message,
            LoopOutput::Response { response } => response,
            LoopOutput::Output { output } => output,
            LoopOutput::Plain { text } => text,
            LoopOutput::Text(text) => text,
            LoopOutput::Other(value) => value.to_string(),
        }
    }
}

/// One server-sent event on the streaming chat endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StreamEvent {
    /// Complete agent response
    Content {
        /// Response text
        content: String,
        /// Session correlation id
        session_id: String,
    },
    /// Invocation failure
    Error {
        /// Error detail
        error: String,
        /// Session correlation id
        session_id: String,
    },
}

impl From<InvocationResult> for StreamEvent {
    fn from(result: InvocationResult) -> Self {
        match result.error {
            Some(error) => StreamEvent::Error {
                error,
                session_id: result.session_id,
            },
            None => StreamEvent::Content {
                content: result.response,
                session_id: result.session_id,
            },
        }
    }
}
