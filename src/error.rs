//! Error types for the gateway

use crate::domain::ServerKey;
use thiserror::Error;

/// Errors that can occur while serving a gateway request
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Endpoint/secret/token lookup failed for an MCP server
    #[error("Credential resolution failed for {server}: {reason}")]
    CredentialResolution { server: ServerKey, reason: String },

    /// Connect + handshake (or the scoped body) exceeded the session timeout
    #[error("MCP session to {server} timed out after {secs}s")]
    SessionTimeout { server: ServerKey, secs: u64 },

    /// Transport connected but the MCP initialize handshake failed
    #[error("MCP handshake with {server} failed: {reason}")]
    Handshake { server: ServerKey, reason: String },

    /// An RPC to a tool failed
    #[error("Tool '{tool}' on {server} failed: {reason}")]
    ToolInvocation {
        server: ServerKey,
        tool: String,
        reason: String,
    },

    /// Neither (or both of) a single message and a message history was supplied
    #[error("Either 'message' or 'messages' must be provided")]
    MissingInput,

    /// Reasoning loop invocation failed
    #[error("Agent error: {0}")]
    Agent(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Agent("Request timed out".to_string())
        } else {
            GatewayError::Agent(err.to_string())
        }
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
