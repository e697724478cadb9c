use clap::Parser;
use std::path::PathBuf;

use crate::config::Mode;

/// 6G edge-network AI assistant gateway
#[derive(Parser, Debug, Clone)]
#[command(name = "edgelink", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "EDGELINK_CONFIG", default_value = "edgelink.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "EDGELINK_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "EDGELINK_PORT")]
    pub port: Option<u16>,

    /// Deployment mode (local or cloud)
    #[arg(long, env = "EDGELINK_MODE", value_enum)]
    pub mode: Option<Mode>,

    /// AWS region for SDK clients
    #[arg(long, env = "EDGELINK_REGION")]
    pub region: Option<String>,

    /// Direct agent runtime URL (local mode)
    #[arg(long, env = "EDGELINK_AGENT_RUNTIME_URL")]
    pub agent_runtime_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["edgelink"]);
        assert_eq!(cli.config, PathBuf::from("edgelink.toml"));
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(cli.mode.is_none());
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from([
            "edgelink",
            "--config",
            "custom.toml",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--mode",
            "cloud",
            "--region",
            "eu-central-1",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.host, Some("0.0.0.0".to_string()));
        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.mode, Some(Mode::Cloud));
        assert_eq!(cli.region, Some("eu-central-1".to_string()));
    }
}
