//! edgelink - 6G edge-network AI assistant gateway
//!
//! Routes chat requests to an LLM-driven agent that invokes tools on
//! three MCP servers managing a simulated 6G edge network, plus direct
//! REST-style query endpoints over the same servers.
//!
//! # Example
//!
//! ```rust,no_run
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cli = edgelink::cli::Cli::parse();
//!     let settings = edgelink::config::Settings::new_with_cli(&cli)?;
//!     let gateway = edgelink::agents::create_gateway(&settings).await?;
//!
//!     let ctx = edgelink::AppContext {
//!         agent: gateway.agent,
//!         sessions: gateway.sessions,
//!     };
//!     let app = edgelink::create_app(ctx, &settings.cors.origins);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod agents;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod mcp;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::adapters::{chat_handler, rest_handler};
use crate::domain::AgentService;
use crate::mcp::McpSessionManager;

/// Shared request state: everything here is read-only wiring chosen at
/// startup. No per-request state survives in it.
#[derive(Clone)]
pub struct AppContext {
    pub agent: Arc<dyn AgentService>,
    pub sessions: Arc<McpSessionManager>,
}

/// Creates the Axum application router with all endpoints configured.
pub fn create_app(ctx: AppContext, cors_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    Router::new()
        .route("/health", get(chat_handler::health))
        .route("/chat", post(chat_handler::chat))
        .route("/chat/stream", post(chat_handler::chat_stream))
        // UDM
        .route("/mcp/udm/subscriptions", get(rest_handler::list_subscriptions))
        .route("/mcp/udm/subscriptions/:subscriber_id", get(rest_handler::get_subscription))
        .route("/mcp/udm/subscriptions/:subscriber_id/qos", get(rest_handler::get_qos_profile))
        .route(
            "/mcp/udm/subscriptions/:subscriber_id/edge-ai",
            get(rest_handler::get_edge_ai_subscriptions),
        )
        .route("/mcp/udm/summary", get(rest_handler::subscription_summary))
        // Edge servers
        .route("/mcp/edge/servers", get(rest_handler::list_edge_servers))
        .route("/mcp/edge/servers/:server_id", get(rest_handler::get_edge_server))
        .route("/mcp/edge/servers/:server_id/resources", get(rest_handler::server_resources))
        .route("/mcp/edge/servers/:server_id/gpu", get(rest_handler::gpu_resources))
        .route("/mcp/edge/servers/:server_id/services", get(rest_handler::deployed_services))
        .route("/mcp/edge/network-summary", get(rest_handler::network_summary))
        .route("/mcp/edge/health-status", get(rest_handler::health_status))
        .route("/mcp/edge/find-capacity", get(rest_handler::find_capacity))
        // AI service catalog
        .route("/mcp/ai-services/services", get(rest_handler::list_ai_services))
        .route(
            "/mcp/ai-services/services/find-by-resources",
            get(rest_handler::find_services_by_resources),
        )
        .route("/mcp/ai-services/services/:service_id", get(rest_handler::get_ai_service))
        .route(
            "/mcp/ai-services/services/:service_id/requirements",
            get(rest_handler::service_requirements),
        )
        .route(
            "/mcp/ai-services/services/:service_id/deployment",
            get(rest_handler::deployment_info),
        )
        .route("/mcp/ai-services/search", get(rest_handler::search_ai_services))
        .route("/mcp/ai-services/categories", get(rest_handler::service_categories))
        .route("/mcp/ai-services/summary", get(rest_handler::catalog_summary))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(ctx)
}
