//! Direct MCP query endpoints
//!
//! Each handler opens a scoped session, issues one tool call and
//! returns the parsed result. Tool failures surface as a 500 with the
//! error detail, matching the chat surface's error wording.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, info};

use crate::domain::ServerKey;
use crate::AppContext;

type ApiError = (StatusCode, Json<Value>);

/// Open a session to `server`, call one tool, close, parse.
///
/// Tools answer with JSON text; anything that fails to parse is passed
/// through as a raw string.
async fn query_tool(
    ctx: &AppContext,
    server: ServerKey,
    tool: &str,
    args: Map<String, Value>,
) -> Result<Json<Value>, ApiError> {
    info!(server = %server, tool, "direct MCP query");

    let tool_name = tool.to_string();
    let result = ctx
        .sessions
        .with_session(server, |session| async move {
            session.call_tool(&tool_name, Some(args)).await
        })
        .await
        .map_err(|e| {
            error!(server = %server, tool, error = %e, "direct MCP query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": e.to_string() })),
            )
        })?;

    Ok(Json(
        serde_json::from_str(&result).unwrap_or(Value::String(result)),
    ))
}

fn no_args() -> Map<String, Value> {
    Map::new()
}

// ---- UDM ----

#[derive(Debug, Deserialize)]
pub struct SubscriptionFilter {
    pub status: Option<String>,
}

pub async fn list_subscriptions(
    State(ctx): State<AppContext>,
    Query(filter): Query<SubscriptionFilter>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    if let Some(status) = filter.status {
        args.insert("status".to_string(), Value::String(status));
    }
    query_tool(&ctx, ServerKey::Udm, "get_all_subscriptions", args).await
}

pub async fn get_subscription(
    State(ctx): State<AppContext>,
    Path(subscriber_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    args.insert("subscriber_id".to_string(), Value::String(subscriber_id));
    query_tool(&ctx, ServerKey::Udm, "get_subscription", args).await
}

pub async fn subscription_summary(
    State(ctx): State<AppContext>,
) -> Result<Json<Value>, ApiError> {
    query_tool(&ctx, ServerKey::Udm, "get_subscription_summary", no_args()).await
}

pub async fn get_qos_profile(
    State(ctx): State<AppContext>,
    Path(subscriber_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    args.insert("subscriber_id".to_string(), Value::String(subscriber_id));
    query_tool(&ctx, ServerKey::Udm, "get_qos_profile", args).await
}

pub async fn get_edge_ai_subscriptions(
    State(ctx): State<AppContext>,
    Path(subscriber_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    args.insert("subscriber_id".to_string(), Value::String(subscriber_id));
    query_tool(&ctx, ServerKey::Udm, "get_edge_ai_subscriptions", args).await
}

// ---- Edge servers ----

#[derive(Debug, Deserialize)]
pub struct EdgeServerFilter {
    pub status: Option<String>,
    pub health: Option<String>,
}

pub async fn list_edge_servers(
    State(ctx): State<AppContext>,
    Query(filter): Query<EdgeServerFilter>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    if let Some(status) = filter.status {
        args.insert("status".to_string(), Value::String(status));
    }
    if let Some(health) = filter.health {
        args.insert("health".to_string(), Value::String(health));
    }
    query_tool(&ctx, ServerKey::EdgeServer, "get_all_edge_servers", args).await
}

pub async fn get_edge_server(
    State(ctx): State<AppContext>,
    Path(server_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    args.insert("server_id".to_string(), Value::String(server_id));
    query_tool(&ctx, ServerKey::EdgeServer, "get_edge_server", args).await
}

pub async fn server_resources(
    State(ctx): State<AppContext>,
    Path(server_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    args.insert("server_id".to_string(), Value::String(server_id));
    query_tool(&ctx, ServerKey::EdgeServer, "get_server_resources", args).await
}

pub async fn gpu_resources(
    State(ctx): State<AppContext>,
    Path(server_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    args.insert("server_id".to_string(), Value::String(server_id));
    query_tool(&ctx, ServerKey::EdgeServer, "get_gpu_resources", args).await
}

pub async fn deployed_services(
    State(ctx): State<AppContext>,
    Path(server_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    args.insert("server_id".to_string(), Value::String(server_id));
    query_tool(&ctx, ServerKey::EdgeServer, "get_deployed_services", args).await
}

pub async fn network_summary(State(ctx): State<AppContext>) -> Result<Json<Value>, ApiError> {
    query_tool(&ctx, ServerKey::EdgeServer, "get_network_summary", no_args()).await
}

pub async fn health_status(State(ctx): State<AppContext>) -> Result<Json<Value>, ApiError> {
    query_tool(
        &ctx,
        ServerKey::EdgeServer,
        "get_server_health_status",
        no_args(),
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct CapacityFilter {
    pub min_cpu: Option<u64>,
    pub min_ram: Option<u64>,
    pub min_gpus: Option<u64>,
}

pub async fn find_capacity(
    State(ctx): State<AppContext>,
    Query(filter): Query<CapacityFilter>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    if let Some(min_cpu) = filter.min_cpu {
        args.insert("min_cpu".to_string(), Value::from(min_cpu));
    }
    if let Some(min_ram) = filter.min_ram {
        args.insert("min_ram".to_string(), Value::from(min_ram));
    }
    if let Some(min_gpus) = filter.min_gpus {
        args.insert("min_gpus".to_string(), Value::from(min_gpus));
    }
    query_tool(
        &ctx,
        ServerKey::EdgeServer,
        "find_servers_with_capacity",
        args,
    )
    .await
}

// ---- AI service catalog ----

#[derive(Debug, Deserialize)]
pub struct AiServiceFilter {
    pub category: Option<String>,
    pub status: Option<String>,
    pub gpu_required: Option<bool>,
}

pub async fn list_ai_services(
    State(ctx): State<AppContext>,
    Query(filter): Query<AiServiceFilter>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    if let Some(category) = filter.category {
        args.insert("category".to_string(), Value::String(category));
    }
    if let Some(status) = filter.status {
        args.insert("status".to_string(), Value::String(status));
    }
    if let Some(gpu_required) = filter.gpu_required {
        args.insert("gpu_required".to_string(), Value::Bool(gpu_required));
    }
    query_tool(&ctx, ServerKey::AiService, "get_all_services", args).await
}

pub async fn get_ai_service(
    State(ctx): State<AppContext>,
    Path(service_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    args.insert("service_id".to_string(), Value::String(service_id));
    query_tool(&ctx, ServerKey::AiService, "get_service", args).await
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
}

pub async fn search_ai_services(
    State(ctx): State<AppContext>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    args.insert("keyword".to_string(), Value::String(query.keyword));
    query_tool(&ctx, ServerKey::AiService, "search_services", args).await
}

pub async fn service_categories(State(ctx): State<AppContext>) -> Result<Json<Value>, ApiError> {
    query_tool(&ctx, ServerKey::AiService, "get_categories", no_args()).await
}

pub async fn catalog_summary(State(ctx): State<AppContext>) -> Result<Json<Value>, ApiError> {
    query_tool(&ctx, ServerKey::AiService, "get_catalog_summary", no_args()).await
}

pub async fn service_requirements(
    State(ctx): State<AppContext>,
    Path(service_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    args.insert("service_id".to_string(), Value::String(service_id));
    query_tool(&ctx, ServerKey::AiService, "get_service_requirements", args).await
}

pub async fn deployment_info(
    State(ctx): State<AppContext>,
    Path(service_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    args.insert("service_id".to_string(), Value::String(service_id));
    query_tool(&ctx, ServerKey::AiService, "get_deployment_info", args).await
}

#[derive(Debug, Deserialize)]
pub struct ResourceConstraintFilter {
    pub max_cpu: Option<u64>,
    pub max_ram: Option<u64>,
    pub max_gpu_memory: Option<u64>,
}

pub async fn find_services_by_resources(
    State(ctx): State<AppContext>,
    Query(filter): Query<ResourceConstraintFilter>,
) -> Result<Json<Value>, ApiError> {
    let mut args = no_args();
    if let Some(max_cpu) = filter.max_cpu {
        args.insert("max_cpu".to_string(), Value::from(max_cpu));
    }
    if let Some(max_ram) = filter.max_ram {
        args.insert("max_ram".to_string(), Value::from(max_ram));
    }
    if let Some(max_gpu_memory) = filter.max_gpu_memory {
        args.insert("max_gpu_memory".to_string(), Value::from(max_gpu_memory));
    }
    query_tool(&ctx, ServerKey::AiService, "find_services_by_resources", args).await
}
