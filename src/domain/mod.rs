//! Domain types and port traits for the gateway
//!
//! Core abstractions shared by the credential, session and agent layers.

mod conversation;
mod invocation;
mod server;

pub use conversation::*;
pub use invocation::*;
pub use server::*;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::error::GatewayResult;

/// Port for invoking tools through an open MCP session
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Server this invoker is connected to
    fn server(&self) -> ServerKey;

    /// Call a tool by name; absent arguments are sent as an empty object
    async fn invoke_tool(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, Value>>,
    ) -> GatewayResult<String>;
}

/// Port for the reasoning loop that turns input + tools into an answer.
///
/// The loop is a black box: it may call any of the supplied tools any
/// number of times before producing its final output.
#[async_trait]
pub trait ReasoningLoop: Send + Sync {
    /// Run one reasoning pass over the input with the given tools
    async fn invoke(
        &self,
        system_prompt: &str,
        tools: &[AgentTool],
        input: &ChatInput,
    ) -> GatewayResult<LoopOutput>;
}

/// Port for the agent invocation surface exposed to the HTTP layer
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Run one agent invocation. Infallible: every internal error is
    /// converted into a failed `InvocationResult`.
    async fn invoke(&self, input: ChatInput, session_id: Option<String>) -> InvocationResult;
}

/// Streaming form of an invocation: one event carrying the complete
/// result. The backing runtime produces no partial responses.
pub fn invoke_stream(
    agent: std::sync::Arc<dyn AgentService>,
    input: ChatInput,
    session_id: Option<String>,
) -> BoxStream<'static, StreamEvent> {
    Box::pin(futures::stream::once(async move {
        StreamEvent::from(agent.invoke(input, session_id).await)
    }))
}
