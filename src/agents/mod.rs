//! Agent invocation: orchestrator, reasoning loop and mode selection

pub mod orchestrator;
pub mod prompt;
pub mod runtime_loop;

pub use orchestrator::AgentOrchestrator;
pub use runtime_loop::{
    DirectRuntimeEndpoint, DiscoveredRuntimeEndpoint, RuntimeAgentLoop, RuntimeEndpoint,
    RuntimeEndpointSource,
};

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{Mode, Settings};
use crate::credentials::aws::{
    build_sdk_config, CognitoIdentityProvider, SecretsManagerStore, SsmParameterStore,
};
use crate::credentials::{
    CloudCredentialResolver, IdentityProvider, LocalCredentialResolver, ParameterStore,
    SecretStore,
};
use crate::domain::AgentService;
use crate::mcp::McpSessionManager;

/// The wired gateway core: the agent service behind `/chat` and the
/// session manager behind the direct MCP query endpoints
pub struct Gateway {
    pub agent: Arc<dyn AgentService>,
    pub sessions: Arc<McpSessionManager>,
}

/// Wire the gateway for the configured mode. Selected once at startup;
/// nothing re-selects at request time.
pub async fn create_gateway(settings: &Settings) -> anyhow::Result<Gateway> {
    let session_timeout = Duration::from_secs(settings.mcp.session_timeout_secs);
    let request_timeout = Duration::from_secs(settings.agent.request_timeout_secs);

    let gateway = match settings.mode {
        Mode::Local => {
            let runtime_url = settings
                .agent
                .runtime_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("agent.runtime_url is required in local mode"))?;

            let resolver = Arc::new(LocalCredentialResolver::new(settings));
            let sessions = Arc::new(McpSessionManager::new(resolver, session_timeout));
            let reasoning = Arc::new(RuntimeAgentLoop::new(Arc::new(DirectRuntimeEndpoint::new(
                runtime_url,
            )))?);

            Gateway {
                agent: Arc::new(AgentOrchestrator::new(
                    sessions.as_ref().clone(),
                    reasoning,
                    request_timeout,
                )),
                sessions,
            }
        }
        Mode::Cloud => {
            let sdk_config = build_sdk_config(&settings.aws.region).await;
            let parameters: Arc<dyn ParameterStore> = Arc::new(SsmParameterStore::new(&sdk_config));
            let secrets: Arc<dyn SecretStore> = Arc::new(SecretsManagerStore::new(&sdk_config));
            let identity: Arc<dyn IdentityProvider> =
                Arc::new(CognitoIdentityProvider::new(&sdk_config));

            let resolver = Arc::new(CloudCredentialResolver::new(
                parameters.clone(),
                secrets.clone(),
                identity.clone(),
            ));
            let sessions = Arc::new(McpSessionManager::new(resolver, session_timeout));
            let endpoint = Arc::new(DiscoveredRuntimeEndpoint::new(
                parameters,
                secrets,
                identity,
                settings.agent.name.clone(),
                settings.aws.region.clone(),
            ));
            let reasoning = Arc::new(RuntimeAgentLoop::new(endpoint)?);

            Gateway {
                agent: Arc::new(AgentOrchestrator::new(
                    sessions.as_ref().clone(),
                    reasoning,
                    request_timeout,
                )),
                sessions,
            }
        }
    };

    info!(mode = %settings.mode, agent = %settings.agent.name, "gateway initialized");
    Ok(gateway)
}
