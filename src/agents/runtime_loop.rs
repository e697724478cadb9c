//! Reasoning loop backed by a remote agent runtime
//!
//! The runtime hosts the agent definition and its own tool wiring; this
//! side only posts the conversation and parses the answer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::credentials::{CognitoSecret, IdentityProvider, ParameterStore, SecretStore};
use crate::domain::{AgentTool, ChatInput, LoopOutput, ReasoningLoop};
use crate::error::{GatewayError, GatewayResult};

/// Budget for one HTTP round trip to the runtime
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Where the runtime lives and how to authenticate to it, resolved
/// fresh on every invocation
#[derive(Debug, Clone)]
pub struct RuntimeEndpoint {
    pub url: String,
    pub bearer_token: Option<String>,
}

/// Port producing the runtime endpoint for one invocation
#[async_trait]
pub trait RuntimeEndpointSource: Send + Sync {
    async fn resolve(&self) -> GatewayResult<RuntimeEndpoint>;
}

/// Fixed runtime URL, no auth (local mode)
pub struct DirectRuntimeEndpoint {
    url: String,
}

impl DirectRuntimeEndpoint {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait]
impl RuntimeEndpointSource for DirectRuntimeEndpoint {
    async fn resolve(&self) -> GatewayResult<RuntimeEndpoint> {
        Ok(RuntimeEndpoint {
            url: self.url.clone(),
            bearer_token: None,
        })
    }
}

/// Cloud-mode discovery: agent ARN from the parameter store, Cognito
/// material from the secret store, a fresh token per call. Same
/// no-cache rule as the MCP credential path.
pub struct DiscoveredRuntimeEndpoint {
    parameters: Arc<dyn ParameterStore>,
    secrets: Arc<dyn SecretStore>,
    identity: Arc<dyn IdentityProvider>,
    agent_name: String,
    region: String,
}

impl DiscoveredRuntimeEndpoint {
    pub fn new(
        parameters: Arc<dyn ParameterStore>,
        secrets: Arc<dyn SecretStore>,
        identity: Arc<dyn IdentityProvider>,
        agent_name: String,
        region: String,
    ) -> Self {
        Self {
            parameters,
            secrets,
            identity,
            agent_name,
            region,
        }
    }
}

#[async_trait]
impl RuntimeEndpointSource for DiscoveredRuntimeEndpoint {
    async fn resolve(&self) -> GatewayResult<RuntimeEndpoint> {
        let arn = self
            .parameters
            .get(&format!("/agent/{}/runtime/agent_arn", self.agent_name))
            .await
            .map_err(|e| GatewayError::Agent(format!("agent ARN lookup failed: {e}")))?;

        let secret = self
            .secrets
            .get(&format!("/agent/{}/cognito/credentials", self.agent_name))
            .await
            .map_err(|e| GatewayError::Agent(format!("agent credential fetch failed: {e}")))?;

        let cognito: CognitoSecret = serde_json::from_value(secret)
            .map_err(|e| GatewayError::Agent(format!("malformed agent credential secret: {e}")))?;

        let token = self
            .identity
            .password_grant(&cognito.client_id, &cognito.username, &cognito.password)
            .await
            .map_err(|e| GatewayError::Agent(format!("agent token exchange failed: {e}")))?;

        let url = format!(
            "https://bedrock-agentcore.{}.amazonaws.com/runtimes/{}/invocations",
            self.region,
            urlencoding::encode(&arn)
        );

        Ok(RuntimeEndpoint {
            url,
            bearer_token: Some(token),
        })
    }
}

/// `ReasoningLoop` implementation that invokes the agent runtime over
/// HTTP and normalizes the variant response shapes it may answer with
pub struct RuntimeAgentLoop {
    http: reqwest::Client,
    endpoint: Arc<dyn RuntimeEndpointSource>,
}

impl RuntimeAgentLoop {
    pub fn new(endpoint: Arc<dyn RuntimeEndpointSource>) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("http client: {e}")))?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl ReasoningLoop for RuntimeAgentLoop {
    async fn invoke(
        &self,
        _system_prompt: &str,
        _tools: &[AgentTool],
        input: &ChatInput,
    ) -> GatewayResult<LoopOutput> {
        let endpoint = self.endpoint.resolve().await?;

        let payload = match input {
            ChatInput::Message(message) => {
                info!("sending single prompt to agent runtime");
                json!({ "prompt": message })
            }
            ChatInput::History(turns) => {
                info!(turns = turns.len(), "sending conversation to agent runtime");
                json!({ "messages": turns })
            }
        };

        debug!(url = %endpoint.url, "invoking agent runtime");

        let mut request = self
            .http
            .post(&endpoint.url)
            .header(reqwest::header::ACCEPT, "application/json, text/event-stream")
            .json(&payload);
        if let Some(token) = &endpoint.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Agent(format!(
                "agent runtime returned {status}: {body}"
            )));
        }

        // Any JSON shape the runtime answers with; raw text as a last resort
        Ok(serde_json::from_str(&body).unwrap_or(LoopOutput::Text(body)))
    }
}
