use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Deployment mode selecting how MCP servers and the agent runtime
/// are located and authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// MCP servers on localhost ports, no auth
    Local,
    /// MCP servers behind a managed runtime with per-request bearer auth
    Cloud,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Local
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Local => write!(f, "local"),
            Mode::Cloud => write!(f, "cloud"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub aws: AwsSettings,
    #[serde(default)]
    pub mcp: McpSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub cors: CorsSettings,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AwsSettings {
    /// AWS region used for all SDK clients
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            region: default_region(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Local-mode MCP server ports and the session timeout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct McpSettings {
    #[serde(default = "default_udm_port")]
    pub udm_port: u16,
    #[serde(default = "default_edge_server_port")]
    pub edge_server_port: u16,
    #[serde(default = "default_ai_service_port")]
    pub ai_service_port: u16,
    /// Budget for connect + handshake + scoped work on one session
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,
}

impl Default for McpSettings {
    fn default() -> Self {
        Self {
            udm_port: default_udm_port(),
            edge_server_port: default_edge_server_port(),
            ai_service_port: default_ai_service_port(),
            session_timeout_secs: default_session_timeout(),
        }
    }
}

fn default_udm_port() -> u16 {
    9001
}

fn default_edge_server_port() -> u16 {
    9002
}

fn default_ai_service_port() -> u16 {
    9003
}

fn default_session_timeout() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentSettings {
    /// Logical agent name, used to derive cloud discovery paths
    #[serde(default = "default_agent_name")]
    pub name: String,
    /// Direct agent runtime URL; required in local mode, ignored in cloud mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_url: Option<String>,
    /// End-to-end budget for one agent invocation
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            runtime_url: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_agent_name() -> String {
    "ai_assistant_agent".to_string()
}

fn default_request_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsSettings {
    #[serde(default = "default_cors_origins")]
    pub origins: Vec<String>,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            origins: default_cors_origins(),
        }
    }
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

impl Settings {
    /// Create settings from CLI arguments (config file + CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(cli.config.clone()).required(false))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);
        settings.validate()?;

        Ok(settings)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(mode) = cli.mode {
            self.mode = mode;
        }
        if let Some(region) = &cli.region {
            self.aws.region = region.clone();
        }
        if let Some(url) = &cli.agent_runtime_url {
            self.agent.runtime_url = Some(url.clone());
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.mode == Mode::Local && self.agent.runtime_url.is_none() {
            anyhow::bail!("agent.runtime_url is required in local mode");
        }
        if self.mcp.session_timeout_secs == 0 {
            anyhow::bail!("mcp.session_timeout_secs must be greater than zero");
        }
        if self.agent.request_timeout_secs == 0 {
            anyhow::bail!("agent.request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Local-mode port for a given MCP server
    pub fn local_port(&self, server: crate::domain::ServerKey) -> u16 {
        match server {
            crate::domain::ServerKey::Udm => self.mcp.udm_port,
            crate::domain::ServerKey::EdgeServer => self.mcp.edge_server_port,
            crate::domain::ServerKey::AiService => self.mcp.ai_service_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServerKey;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["edgelink"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn defaults_apply_when_no_file_present() {
        let settings = Settings::new_with_cli(&cli(&[
            "--config",
            "/nonexistent/edgelink.toml",
            "--agent-runtime-url",
            "http://localhost:8080/invocations",
        ]))
        .unwrap();

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.mode, Mode::Local);
        assert_eq!(settings.aws.region, "us-east-1");
        assert_eq!(settings.mcp.session_timeout_secs, 120);
        assert_eq!(settings.agent.name, "ai_assistant_agent");
        assert_eq!(settings.agent.request_timeout_secs, 300);
        assert_eq!(settings.cors.origins.len(), 3);
    }

    #[test]
    fn local_ports_map_to_servers() {
        let settings = Settings::new_with_cli(&cli(&[
            "--config",
            "/nonexistent/edgelink.toml",
            "--agent-runtime-url",
            "http://localhost:8080/invocations",
        ]))
        .unwrap();

        assert_eq!(settings.local_port(ServerKey::Udm), 9001);
        assert_eq!(settings.local_port(ServerKey::EdgeServer), 9002);
        assert_eq!(settings.local_port(ServerKey::AiService), 9003);
    }

    #[test]
    fn cli_overrides_take_precedence() {
        let settings = Settings::new_with_cli(&cli(&[
            "--config",
            "/nonexistent/edgelink.toml",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--mode",
            "cloud",
            "--region",
            "eu-west-1",
        ]))
        .unwrap();

        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.mode, Mode::Cloud);
        assert_eq!(settings.aws.region, "eu-west-1");
    }

    #[test]
    fn local_mode_requires_runtime_url() {
        let err =
            Settings::new_with_cli(&cli(&["--config", "/nonexistent/edgelink.toml"])).unwrap_err();
        assert!(err.to_string().contains("runtime_url"));
    }
}
