//! Agent invocation orchestration

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::prompt::SYSTEM_PROMPT;
use crate::domain::{
    AgentService, AgentTool, ChatInput, InvocationResult, ReasoningLoop, ToolInvoker,
};
use crate::error::{GatewayError, GatewayResult};
use crate::mcp::{McpSession, McpSessionManager};

/// Runs one agent invocation end to end: open all sessions, enumerate
/// tools, run the reasoning loop once, normalize, tear down.
///
/// The single error-conversion boundary lives in `invoke`: everything
/// below it propagates `GatewayError`, everything above it sees a fully
/// populated `InvocationResult`.
pub struct AgentOrchestrator {
    sessions: McpSessionManager,
    reasoning: Arc<dyn ReasoningLoop>,
    request_timeout: Duration,
}

impl AgentOrchestrator {
    pub fn new(
        sessions: McpSessionManager,
        reasoning: Arc<dyn ReasoningLoop>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            sessions,
            reasoning,
            request_timeout,
        }
    }

    async fn run(&self, input: &ChatInput) -> GatewayResult<String> {
        let budget = self.request_timeout;
        self.sessions
            .with_all_sessions(|sessions| async move {
                match tokio::time::timeout(budget, self.reason(sessions, input)).await {
                    Ok(result) => result,
                    Err(_) => Err(GatewayError::Agent(format!(
                        "invocation exceeded the {}s budget",
                        budget.as_secs()
                    ))),
                }
            })
            .await
    }

    async fn reason(
        &self,
        sessions: Vec<Arc<McpSession>>,
        input: &ChatInput,
    ) -> GatewayResult<String> {
        let mut tools = Vec::new();
        for session in &sessions {
            match session.list_tools().await {
                Ok(descriptors) => {
                    info!(
                        server = %session.server(),
                        count = descriptors.len(),
                        "loaded tools"
                    );
                    tools.extend(descriptors.into_iter().map(|descriptor| AgentTool {
                        server: session.server(),
                        descriptor,
                        invoker: session.clone() as Arc<dyn ToolInvoker>,
                    }));
                }
                // One unreachable server must not sink the invocation
                Err(e) => {
                    warn!(server = %session.server(), error = %e, "failed to load tools")
                }
            }
        }

        let output = self.reasoning.invoke(SYSTEM_PROMPT, &tools, input).await?;
        Ok(output.into_text())
    }
}

#[async_trait]
impl AgentService for AgentOrchestrator {
    async fn invoke(&self, input: ChatInput, session_id: Option<String>) -> InvocationResult {
        let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        info!(session_id = %session_id, message = %input.latest_text(), "invoking agent");

        match self.run(&input).await {
            Ok(response) => {
                info!(session_id = %session_id, "agent invocation succeeded");
                InvocationResult::success(response, session_id)
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "agent invocation failed");
                InvocationResult::failure(e.to_string(), session_id)
            }
        }
    }
}
