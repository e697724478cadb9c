//! Minimal MCP tool server for integration tests, served over the
//! streamable HTTP transport on an ephemeral port.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use rmcp::{
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
    },
    ErrorData as McpError, RoleServer,
};
use serde_json::{json, Value};

pub struct MockTool {
    pub name: String,
    pub description: String,
    pub schema: serde_json::Map<String, Value>,
    pub response: String,
}

impl MockTool {
    pub fn new(name: &str, response: &str) -> Self {
        let schema = json!({
            "type": "object",
            "properties": {}
        });
        Self {
            name: name.to_string(),
            description: format!("{name} test tool"),
            schema: schema.as_object().cloned().unwrap_or_default(),
            response: response.to_string(),
        }
    }
}

/// Tool server answering every call with a fixed text response and
/// recording the tool names it was asked for
#[derive(Clone)]
pub struct MockToolServer {
    tools: Arc<Vec<MockTool>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockToolServer {
    pub fn new(tools: Vec<MockTool>) -> Self {
        Self {
            tools: Arc::new(tools),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn single(name: &str, response: &str) -> Self {
        Self::new(vec![MockTool::new(name, response)])
    }
}

impl ServerHandler for MockToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mock-mcp-server".to_string(),
                version: "0.0.0".to_string(),
                title: None,
                website_url: None,
                icons: None,
            },
            instructions: None,
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.tools.clone();
        async move {
            Ok(ListToolsResult {
                tools: tools
                    .iter()
                    .map(|t| Tool::new(t.name.clone(), t.description.clone(), t.schema.clone()))
                    .collect(),
                next_cursor: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tools = self.tools.clone();
        let calls = self.calls.clone();
        async move {
            calls.lock().unwrap().push(request.name.to_string());
            let tool = tools
                .iter()
                .find(|t| t.name == request.name.as_ref())
                .ok_or_else(|| {
                    McpError::invalid_params(format!("unknown tool: {}", request.name), None)
                })?;
            Ok(CallToolResult::success(vec![Content::text(
                tool.response.clone(),
            )]))
        }
    }
}

/// Serve the mock at `http://{addr}/mcp`
pub async fn spawn(server: MockToolServer) -> SocketAddr {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );
    let app = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Wait for server to be ready
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    addr
}

/// An address nothing is listening on
pub async fn unreachable_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
