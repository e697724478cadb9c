//! MCP server registry

use serde::{Deserialize, Serialize};

/// Identifier for one of the managed MCP servers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerKey {
    /// Unified Data Management (subscriber data)
    Udm,
    /// Edge server inventory and health
    EdgeServer,
    /// AI service catalog
    AiService,
}

impl ServerKey {
    /// All managed servers, in registry order
    pub const ALL: [ServerKey; 3] = [ServerKey::Udm, ServerKey::EdgeServer, ServerKey::AiService];

    /// Canonical string key (used in parameter and secret paths)
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerKey::Udm => "udm",
            ServerKey::EdgeServer => "edge_server",
            ServerKey::AiService => "ai_service",
        }
    }

    /// Static descriptor for this server
    pub fn descriptor(&self) -> &'static ServerDescriptor {
        match self {
            ServerKey::Udm => &DESCRIPTORS[0],
            ServerKey::EdgeServer => &DESCRIPTORS[1],
            ServerKey::AiService => &DESCRIPTORS[2],
        }
    }
}

impl std::fmt::Display for ServerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static metadata for a managed MCP server
#[derive(Debug)]
pub struct ServerDescriptor {
    /// Registry key
    pub key: ServerKey,
    /// Human-readable name
    pub display_name: &'static str,
    /// What the server manages
    pub description: &'static str,
}

impl ServerDescriptor {
    /// Parameter-store path holding the server's runtime URL
    pub fn endpoint_parameter_path(&self) -> String {
        format!("/mcp/{}/runtime/url", self.key)
    }

    /// Secret-store path holding the server's Cognito credentials
    pub fn secret_path(&self) -> String {
        format!("/mcp/{}/cognito/credentials", self.key)
    }
}

static DESCRIPTORS: [ServerDescriptor; 3] = [
    ServerDescriptor {
        key: ServerKey::Udm,
        display_name: "UDM Server",
        description: "Subscriber data management for the simulated 6G core",
    },
    ServerDescriptor {
        key: ServerKey::EdgeServer,
        display_name: "Edge Server Manager",
        description: "Edge server inventory, capacity and health",
    },
    ServerDescriptor {
        key: ServerKey::AiService,
        display_name: "AI Service Catalog",
        description: "Deployable AI service catalog for the edge network",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_render_canonical_strings() {
        assert_eq!(ServerKey::Udm.to_string(), "udm");
        assert_eq!(ServerKey::EdgeServer.to_string(), "edge_server");
        assert_eq!(ServerKey::AiService.to_string(), "ai_service");
    }

    #[test]
    fn descriptor_paths_follow_naming_convention() {
        let desc = ServerKey::EdgeServer.descriptor();
        assert_eq!(desc.endpoint_parameter_path(), "/mcp/edge_server/runtime/url");
        assert_eq!(desc.secret_path(), "/mcp/edge_server/cognito/credentials");
    }

    #[test]
    fn all_covers_every_descriptor() {
        for key in ServerKey::ALL {
            assert_eq!(key.descriptor().key, key);
        }
    }
}
