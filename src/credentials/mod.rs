//! Credential resolution for MCP servers
//!
//! Every resolution is performed from scratch: endpoint lookup, secret
//! fetch and token exchange happen on each call, with nothing cached
//! between invocations.

pub mod aws;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Settings;
use crate::domain::ServerKey;
use crate::error::{GatewayError, GatewayResult};

/// A bearer credential minted for one session
#[derive(Debug, Clone)]
pub struct Credential {
    /// Access token presented on the MCP transport
    pub bearer_token: String,
    /// Identity-provider app client the token was issued for
    pub client_id: String,
    /// User pool id, when the secret carries one
    pub pool_id: Option<String>,
}

/// A server endpoint plus the credential (if any) needed to reach it
#[derive(Debug, Clone)]
pub struct ResolvedServer {
    /// Streamable HTTP endpoint URL
    pub endpoint: String,
    /// Bearer credential; absent in local mode
    pub credential: Option<Credential>,
}

/// Port for resolving an MCP server's endpoint and credential
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(&self, server: ServerKey) -> GatewayResult<ResolvedServer>;
}

/// Port over the parameter store (endpoint discovery)
#[async_trait]
pub trait ParameterStore: Send + Sync {
    async fn get(&self, path: &str) -> GatewayResult<String>;
}

/// Port over the secret store (credential material)
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, path: &str) -> GatewayResult<Value>;
}

/// Port over the identity provider (token exchange)
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn password_grant(
        &self,
        client_id: &str,
        username: &str,
        password: &str,
    ) -> GatewayResult<String>;
}

/// Local-mode resolver: localhost endpoints, no credentials
pub struct LocalCredentialResolver {
    udm_port: u16,
    edge_server_port: u16,
    ai_service_port: u16,
}

impl LocalCredentialResolver {
    pub fn new(settings: &Settings) -> Self {
        Self {
            udm_port: settings.mcp.udm_port,
            edge_server_port: settings.mcp.edge_server_port,
            ai_service_port: settings.mcp.ai_service_port,
        }
    }
}

#[async_trait]
impl CredentialResolver for LocalCredentialResolver {
    async fn resolve(&self, server: ServerKey) -> GatewayResult<ResolvedServer> {
        let port = match server {
            ServerKey::Udm => self.udm_port,
            ServerKey::EdgeServer => self.edge_server_port,
            ServerKey::AiService => self.ai_service_port,
        };
        Ok(ResolvedServer {
            endpoint: format!("http://localhost:{port}/mcp"),
            credential: None,
        })
    }
}

/// Credential material stored in the secret store for one server.
///
/// All three fields are required; a secret missing any of them is a
/// resolution error rather than something to paper over with defaults.
#[derive(Debug, Deserialize)]
pub(crate) struct CognitoSecret {
    pub(crate) client_id: String,
    pub(crate) username: String,
    pub(crate) password: String,
    #[serde(default)]
    pub(crate) pool_id: Option<String>,
}

/// Cloud-mode resolver: parameter store for the endpoint, secret store
/// for the Cognito material, then a fresh password grant per call
pub struct CloudCredentialResolver {
    parameters: Arc<dyn ParameterStore>,
    secrets: Arc<dyn SecretStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl CloudCredentialResolver {
    pub fn new(
        parameters: Arc<dyn ParameterStore>,
        secrets: Arc<dyn SecretStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            parameters,
            secrets,
            identity,
        }
    }
}

#[async_trait]
impl CredentialResolver for CloudCredentialResolver {
    async fn resolve(&self, server: ServerKey) -> GatewayResult<ResolvedServer> {
        let descriptor = server.descriptor();

        let endpoint = self
            .parameters
            .get(&descriptor.endpoint_parameter_path())
            .await
            .map_err(|e| resolution_error(server, format!("endpoint lookup failed: {e}")))?;

        let secret = self
            .secrets
            .get(&descriptor.secret_path())
            .await
            .map_err(|e| resolution_error(server, format!("secret fetch failed: {e}")))?;

        let cognito: CognitoSecret = serde_json::from_value(secret)
            .map_err(|e| resolution_error(server, format!("malformed credential secret: {e}")))?;

        let bearer_token = self
            .identity
            .password_grant(&cognito.client_id, &cognito.username, &cognito.password)
            .await
            .map_err(|e| resolution_error(server, format!("token exchange failed: {e}")))?;

        debug!(server = %server, "resolved endpoint and minted bearer token");

        Ok(ResolvedServer {
            endpoint,
            credential: Some(Credential {
                bearer_token,
                client_id: cognito.client_id,
                pool_id: cognito.pool_id,
            }),
        })
    }
}

fn resolution_error(server: ServerKey, reason: String) -> GatewayError {
    GatewayError::CredentialResolution { server, reason }
}
