use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use rmcp::{
    model::{
        CallToolRequestParam, ClientCapabilities, ClientInfo, Implementation,
        InitializeRequestParam,
    },
    service::{Peer, RunningService},
    transport::{
        streamable_http_client::StreamableHttpClientTransportConfig, StreamableHttpClientTransport,
    },
    RoleClient, ServiceExt,
};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::credentials::CredentialResolver;
use crate::domain::{ServerKey, ToolDescriptor, ToolInvoker};
use crate::error::{GatewayError, GatewayResult};

fn client_info() -> ClientInfo {
    ClientInfo {
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "edgelink".to_string(),
            title: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

/// One open MCP session: transport, completed handshake, ready for RPCs.
///
/// `close` is idempotent; after it runs the peer handle goes stale and
/// further RPCs fail, which is fine because the session manager never
/// hands a session out past its scope.
pub struct McpSession {
    server: ServerKey,
    peer: Peer<RoleClient>,
    service: Mutex<Option<RunningService<RoleClient, InitializeRequestParam>>>,
}

impl McpSession {
    /// Server this session is connected to
    pub fn server(&self) -> ServerKey {
        self.server
    }

    /// One `tools/list` RPC, mapped to descriptors. Parameter names are
    /// the keys of the input schema's `properties`, omitted when empty.
    pub async fn list_tools(&self) -> GatewayResult<Vec<ToolDescriptor>> {
        let result = self
            .peer
            .list_tools(Default::default())
            .await
            .map_err(|e| GatewayError::ToolInvocation {
                server: self.server,
                tool: "tools/list".to_string(),
                reason: e.to_string(),
            })?;

        Ok(result
            .tools
            .into_iter()
            .map(|tool| {
                let parameters = tool
                    .input_schema
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| props.keys().cloned().collect::<Vec<_>>())
                    .filter(|names| !names.is_empty());
                ToolDescriptor {
                    name: tool.name.to_string(),
                    description: tool
                        .description
                        .map(|d| d.to_string())
                        .unwrap_or_default(),
                    parameters,
                }
            })
            .collect())
    }

    /// One `tools/call` RPC. Absent arguments are sent as an empty
    /// object. Returns the first text content part, or the whole result
    /// envelope as JSON when there is none.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, Value>>,
    ) -> GatewayResult<String> {
        let result = self
            .peer
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments: Some(arguments.unwrap_or_default()),
            })
            .await
            .map_err(|e| GatewayError::ToolInvocation {
                server: self.server,
                tool: name.to_string(),
                reason: e.to_string(),
            })?;

        for item in &result.content {
            if let Some(text) = item.as_text() {
                return Ok(text.text.clone());
            }
        }
        Ok(serde_json::to_string(&result)?)
    }

    /// Close the session: cancel the local client service and drop the
    /// transport. Never signals remote cancellation. Safe to call twice.
    pub async fn close(&self) {
        let service = self.service.lock().await.take();
        if let Some(service) = service {
            debug!(server = %self.server, "closing MCP session");
            if let Err(e) = service.cancel().await {
                warn!(server = %self.server, error = %e, "error while closing MCP session");
            }
        }
    }
}

#[async_trait]
impl ToolInvoker for McpSession {
    fn server(&self) -> ServerKey {
        self.server
    }

    async fn invoke_tool(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, Value>>,
    ) -> GatewayResult<String> {
        self.call_tool(name, arguments).await
    }
}

/// Opens, scopes and tears down MCP sessions.
///
/// Credentials are resolved fresh inside every `open`; nothing about a
/// previous session survives into the next one.
#[derive(Clone)]
pub struct McpSessionManager {
    resolver: Arc<dyn CredentialResolver>,
    session_timeout: Duration,
}

impl McpSessionManager {
    pub fn new(resolver: Arc<dyn CredentialResolver>, session_timeout: Duration) -> Self {
        Self {
            resolver,
            session_timeout,
        }
    }

    /// Resolve, connect and handshake one session. The connect plus
    /// handshake is bounded by the session timeout.
    pub async fn open(&self, server: ServerKey) -> GatewayResult<Arc<McpSession>> {
        let resolved = self.resolver.resolve(server).await?;

        let connect = async {
            let transport = match &resolved.credential {
                Some(credential) => {
                    let mut cfg =
                        StreamableHttpClientTransportConfig::with_uri(resolved.endpoint.clone());
                    cfg.auth_header = Some(credential.bearer_token.clone());
                    StreamableHttpClientTransport::from_config(cfg)
                }
                None => StreamableHttpClientTransport::from_uri(resolved.endpoint.clone()),
            };
            client_info().serve(transport).await
        };

        let service = tokio::time::timeout(self.session_timeout, connect)
            .await
            .map_err(|_| GatewayError::SessionTimeout {
                server,
                secs: self.session_timeout.as_secs(),
            })?
            .map_err(|e| GatewayError::Handshake {
                server,
                reason: e.to_string(),
            })?;

        debug!(server = %server, endpoint = %resolved.endpoint, "MCP session ready");

        let peer = service.peer().clone();
        Ok(Arc::new(McpSession {
            server,
            peer,
            service: Mutex::new(Some(service)),
        }))
    }

    /// Run `body` with a freshly opened session, closing it on every
    /// exit path. The open and the body share the session time budget.
    pub async fn with_session<T, F, Fut>(&self, server: ServerKey, body: F) -> GatewayResult<T>
    where
        F: FnOnce(Arc<McpSession>) -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let started = Instant::now();
        let session = self.open(server).await?;

        let remaining = self.session_timeout.saturating_sub(started.elapsed());
        let result = match tokio::time::timeout(remaining, body(session.clone())).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::SessionTimeout {
                server,
                secs: self.session_timeout.as_secs(),
            }),
        };

        session.close().await;
        result
    }

    /// Run `body` with one fresh session per managed server, opened
    /// concurrently. An unreachable server (handshake failure) is
    /// skipped with a warning and contributes no session; credential
    /// and timeout failures abort, closing whatever already opened.
    /// Every session that opened is closed before this returns, on
    /// success and on failure.
    pub async fn with_all_sessions<T, F, Fut>(&self, body: F) -> GatewayResult<T>
    where
        F: FnOnce(Vec<Arc<McpSession>>) -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let opens = ServerKey::ALL.map(|server| self.open(server));
        let outcomes = join_all(opens).await;

        let mut sessions = Vec::with_capacity(outcomes.len());
        let mut fatal = None;
        for outcome in outcomes {
            match outcome {
                Ok(session) => sessions.push(session),
                Err(e @ GatewayError::Handshake { .. }) => {
                    warn!(error = %e, "server unreachable, continuing without it");
                }
                Err(e) => {
                    if fatal.is_none() {
                        fatal = Some(e);
                    }
                }
            }
        }

        if let Some(error) = fatal {
            for session in &sessions {
                session.close().await;
            }
            return Err(error);
        }

        let result = body(sessions.clone()).await;

        for session in &sessions {
            session.close().await;
        }
        result
    }
}
