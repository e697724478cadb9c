//! Orchestrator behavior against live mock MCP servers: credential
//! rotation, session teardown and tool-listing resilience.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use common::mock_mcp::{spawn, unreachable_addr, MockToolServer};
use edgelink::agents::AgentOrchestrator;
use edgelink::credentials::{
    CloudCredentialResolver, CredentialResolver, IdentityProvider, ParameterStore, ResolvedServer,
    SecretStore,
};
use edgelink::domain::{
    AgentService, AgentTool, ChatInput, LoopOutput, ReasoningLoop, ServerKey,
};
use edgelink::error::{GatewayError, GatewayResult};
use edgelink::mcp::McpSessionManager;

// ---- fakes ----

struct MapParameters(HashMap<String, String>);

#[async_trait]
impl ParameterStore for MapParameters {
    async fn get(&self, path: &str) -> GatewayResult<String> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| GatewayError::Internal(format!("no parameter at {path}")))
    }
}

/// Secret store whose password changes on every fetch
struct RotatingSecrets {
    fetches: Mutex<u64>,
}

#[async_trait]
impl SecretStore for RotatingSecrets {
    async fn get(&self, _path: &str) -> GatewayResult<Value> {
        let mut fetches = self.fetches.lock().unwrap();
        *fetches += 1;
        Ok(json!({
            "client_id": "client",
            "username": "svc",
            "password": format!("pw-{}", *fetches),
        }))
    }
}

/// Records every password it sees and mints a unique token per grant
struct CapturingIdentity {
    passwords: Mutex<Vec<String>>,
}

#[async_trait]
impl IdentityProvider for CapturingIdentity {
    async fn password_grant(&self, _: &str, _: &str, password: &str) -> GatewayResult<String> {
        let mut passwords = self.passwords.lock().unwrap();
        passwords.push(password.to_string());
        Ok(format!("token-for-{password}"))
    }
}

/// Resolver serving fixed endpoints with no credentials
struct StaticResolver(HashMap<ServerKey, String>);

#[async_trait]
impl CredentialResolver for StaticResolver {
    async fn resolve(&self, server: ServerKey) -> GatewayResult<ResolvedServer> {
        Ok(ResolvedServer {
            endpoint: self.0[&server].clone(),
            credential: None,
        })
    }
}

/// Reasoning loop that records the tools it was handed
struct CapturingLoop {
    tools: Mutex<Vec<AgentTool>>,
}

#[async_trait]
impl ReasoningLoop for CapturingLoop {
    async fn invoke(
        &self,
        _system_prompt: &str,
        tools: &[AgentTool],
        _input: &ChatInput,
    ) -> GatewayResult<LoopOutput> {
        *self.tools.lock().unwrap() = tools.to_vec();
        Ok(LoopOutput::Text("done".to_string()))
    }
}

struct FailingLoop;

#[async_trait]
impl ReasoningLoop for FailingLoop {
    async fn invoke(
        &self,
        _system_prompt: &str,
        _tools: &[AgentTool],
        _input: &ChatInput,
    ) -> GatewayResult<LoopOutput> {
        Err(GatewayError::Agent("loop exploded".to_string()))
    }
}

/// Records the tools it was handed, then fails
struct CapturingFailingLoop {
    tools: Mutex<Vec<AgentTool>>,
}

#[async_trait]
impl ReasoningLoop for CapturingFailingLoop {
    async fn invoke(
        &self,
        _system_prompt: &str,
        tools: &[AgentTool],
        _input: &ChatInput,
    ) -> GatewayResult<LoopOutput> {
        *self.tools.lock().unwrap() = tools.to_vec();
        Err(GatewayError::Agent("loop exploded".to_string()))
    }
}

// ---- scaffolding ----

async fn three_mock_endpoints() -> HashMap<ServerKey, String> {
    let mut endpoints = HashMap::new();
    for server in ServerKey::ALL {
        let addr = spawn(MockToolServer::single("ping", "pong")).await;
        endpoints.insert(server, format!("http://{addr}/mcp"));
    }
    endpoints
}

fn cloud_resolver(
    endpoints: &HashMap<ServerKey, String>,
) -> (Arc<CloudCredentialResolver>, Arc<CapturingIdentity>) {
    let parameters: HashMap<String, String> = endpoints
        .iter()
        .map(|(server, url)| {
            (
                server.descriptor().endpoint_parameter_path(),
                url.clone(),
            )
        })
        .collect();
    let identity = Arc::new(CapturingIdentity {
        passwords: Mutex::new(Vec::new()),
    });
    let resolver = Arc::new(CloudCredentialResolver::new(
        Arc::new(MapParameters(parameters)),
        Arc::new(RotatingSecrets {
            fetches: Mutex::new(0),
        }),
        identity.clone(),
    ));
    (resolver, identity)
}

fn orchestrator(
    resolver: Arc<dyn CredentialResolver>,
    reasoning: Arc<dyn ReasoningLoop>,
) -> AgentOrchestrator {
    AgentOrchestrator::new(
        McpSessionManager::new(resolver, Duration::from_secs(30)),
        reasoning,
        Duration::from_secs(30),
    )
}

// ---- tests ----

#[tokio::test]
async fn every_invocation_re_resolves_all_credentials() {
    let endpoints = three_mock_endpoints().await;
    let (resolver, identity) = cloud_resolver(&endpoints);
    let agent = orchestrator(
        resolver,
        Arc::new(CapturingLoop {
            tools: Mutex::new(Vec::new()),
        }),
    );

    for _ in 0..2 {
        let result = agent
            .invoke(ChatInput::Message("hello".to_string()), None)
            .await;
        assert!(result.success, "unexpected failure: {:?}", result.error);
    }

    // 3 servers x 2 invocations, each with the secret current at fetch time
    let passwords = identity.passwords.lock().unwrap().clone();
    assert_eq!(passwords.len(), 6);
    let unique: std::collections::HashSet<_> = passwords.iter().collect();
    assert_eq!(unique.len(), 6, "a credential was reused: {passwords:?}");
}

#[tokio::test]
async fn concurrent_invocations_get_distinct_tokens() {
    let endpoints = three_mock_endpoints().await;
    let (resolver, identity) = cloud_resolver(&endpoints);
    let agent = Arc::new(orchestrator(
        resolver,
        Arc::new(CapturingLoop {
            tools: Mutex::new(Vec::new()),
        }),
    ));

    let (a, b) = tokio::join!(
        agent.invoke(ChatInput::Message("first".to_string()), None),
        agent.invoke(ChatInput::Message("second".to_string()), None),
    );
    assert!(a.success && b.success);
    assert_ne!(a.session_id, b.session_id);

    let passwords = identity.passwords.lock().unwrap().clone();
    let unique: std::collections::HashSet<_> = passwords.iter().collect();
    assert_eq!(unique.len(), 6, "concurrent invocations shared a credential");
}

#[tokio::test]
async fn sessions_are_closed_after_a_successful_invocation() {
    let endpoints = three_mock_endpoints().await;
    let reasoning = Arc::new(CapturingLoop {
        tools: Mutex::new(Vec::new()),
    });
    let agent = orchestrator(Arc::new(StaticResolver(endpoints)), reasoning.clone());

    let result = agent
        .invoke(ChatInput::Message("hello".to_string()), None)
        .await;
    assert!(result.success);
    assert_eq!(result.response, "done");

    // the tools were bound to sessions that are now closed
    let tools = reasoning.tools.lock().unwrap().clone();
    assert_eq!(tools.len(), 3);
    for tool in &tools {
        assert!(
            tool.call(None).await.is_err(),
            "session for {} still accepted calls after invoke returned",
            tool.server
        );
    }
}

#[tokio::test]
async fn sessions_are_closed_after_a_failed_invocation() {
    let endpoints = three_mock_endpoints().await;
    let reasoning = Arc::new(CapturingFailingLoop {
        tools: Mutex::new(Vec::new()),
    });
    let agent = orchestrator(Arc::new(StaticResolver(endpoints)), reasoning.clone());

    let result = agent
        .invoke(ChatInput::Message("hello".to_string()), None)
        .await;
    assert!(!result.success);

    let tools = reasoning.tools.lock().unwrap().clone();
    assert_eq!(tools.len(), 3);
    for tool in &tools {
        assert!(
            tool.call(None).await.is_err(),
            "session for {} still accepted calls after a failed invoke",
            tool.server
        );
    }
}

#[tokio::test]
async fn loop_failure_produces_the_error_envelope() {
    let endpoints = three_mock_endpoints().await;
    let agent = orchestrator(Arc::new(StaticResolver(endpoints)), Arc::new(FailingLoop));

    let result = agent
        .invoke(ChatInput::Message("hello".to_string()), None)
        .await;
    assert!(!result.success);
    assert!(result.response.starts_with("Error invoking agent: "));
    assert!(result.error.as_deref().unwrap_or_default().contains("loop exploded"));
}

#[tokio::test]
async fn credential_failure_fails_the_invocation() {
    let endpoints = three_mock_endpoints().await;
    let mut parameters: HashMap<String, String> = endpoints
        .iter()
        .map(|(server, url)| {
            (
                server.descriptor().endpoint_parameter_path(),
                url.clone(),
            )
        })
        .collect();
    // udm endpoint parameter is gone
    parameters.remove(&ServerKey::Udm.descriptor().endpoint_parameter_path());

    let resolver = Arc::new(CloudCredentialResolver::new(
        Arc::new(MapParameters(parameters)),
        Arc::new(RotatingSecrets {
            fetches: Mutex::new(0),
        }),
        Arc::new(CapturingIdentity {
            passwords: Mutex::new(Vec::new()),
        }),
    ));
    let agent = orchestrator(
        resolver,
        Arc::new(CapturingLoop {
            tools: Mutex::new(Vec::new()),
        }),
    );

    let result = agent
        .invoke(ChatInput::Message("hello".to_string()), None)
        .await;
    assert!(!result.success);
    assert!(result
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("Credential resolution failed"));
}

#[tokio::test]
async fn one_unreachable_server_degrades_to_fewer_tools() {
    let mut endpoints = HashMap::new();
    for server in [ServerKey::Udm, ServerKey::EdgeServer] {
        let addr = spawn(MockToolServer::single("ping", "pong")).await;
        endpoints.insert(server, format!("http://{addr}/mcp"));
    }
    endpoints.insert(
        ServerKey::AiService,
        format!("http://{}/mcp", unreachable_addr().await),
    );

    let reasoning = Arc::new(CapturingLoop {
        tools: Mutex::new(Vec::new()),
    });
    let agent = orchestrator(Arc::new(StaticResolver(endpoints)), reasoning.clone());

    let result = agent
        .invoke(ChatInput::Message("hello".to_string()), None)
        .await;
    assert!(result.success, "unexpected failure: {:?}", result.error);

    let tools = reasoning.tools.lock().unwrap().clone();
    assert_eq!(tools.len(), 2);
    assert!(tools.iter().all(|t| t.server != ServerKey::AiService));
}

#[tokio::test]
async fn session_ids_pass_through_unchanged() {
    let endpoints = three_mock_endpoints().await;
    let agent = orchestrator(
        Arc::new(StaticResolver(endpoints)),
        Arc::new(CapturingLoop {
            tools: Mutex::new(Vec::new()),
        }),
    );

    let result = agent
        .invoke(
            ChatInput::Message("hello".to_string()),
            Some("caller-chosen".to_string()),
        )
        .await;
    assert_eq!(result.session_id, "caller-chosen");

    let synthesized = agent
        .invoke(ChatInput::Message("hello".to_string()), None)
        .await;
    assert!(uuid::Uuid::parse_str(&synthesized.session_id).is_ok());
}
