use async_trait::async_trait;
use rust_mcp_sdk::schema::TextContent;
use rust_mcp_sdk::schema::{
    CallToolRequest, CallToolResult, ListToolsRequest, ListToolsResult, RpcError, schema_utils::CallToolError,
};
use rust_mcp_sdk::{McpServer, mcp_server::ServerHandler};

use crate::formatter::format_rows;
use crate::graph::GraphStore;
use crate::mcp::tools::{GetGraphSchemaTool, ReadGraphQueryTool};
use crate::schema::GraphSchema;

const SCHEMA_SAMPLE_SIZE: usize = 100;

// Handles MCP messages against the book-review graph.
pub struct BookGraphServerHandler {
    store: GraphStore,
}

impl BookGraphServerHandler {
    #[must_use]
    pub fn new(store: GraphStore) -> Self {
        Self { store }
    }

    async fn read_graph_query(
        &self,
        args: ReadGraphQueryTool,
    ) -> Result<String, String> {
        let rows = self
            .store
            .ro_query(&args.query)
            .await
            .map_err(|e| format!("query failed: {e}"))?;
        Ok(format_rows(&rows))
    }

    async fn get_graph_schema(&self) -> Result<String, String> {
        let schema = GraphSchema::discover(&self.store, SCHEMA_SAMPLE_SIZE)
            .await
            .map_err(|e| format!("schema discovery failed: {e}"))?;
        serde_json::to_string_pretty(&schema).map_err(|e| format!("failed to serialize schema: {e}"))
    }
}

#[async_trait]
impl ServerHandler for BookGraphServerHandler {
    async fn handle_list_tools_request(
        &self,
        _request: ListToolsRequest,
        _runtime: std::sync::Arc<dyn McpServer>,
    ) -> std::result::Result<ListToolsResult, RpcError> {
        tracing::info!("handling list tools request");
        Ok(ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: vec![ReadGraphQueryTool::tool(), GetGraphSchemaTool::tool()],
        })
    }

    async fn handle_call_tool_request(
        &self,
        request: CallToolRequest,
        _runtime: std::sync::Arc<dyn McpServer>,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let tool_name = request.tool_name().to_string();
        tracing::info!("handling call tool request for '{tool_name}'");

        let arguments = serde_json::Value::Object(request.params.arguments.unwrap_or_default());

        let outcome = if tool_name == ReadGraphQueryTool::tool_name() {
            let args = serde_json::from_value::<ReadGraphQueryTool>(arguments).map_err(CallToolError::new)?;
            tracing::info!("read_graph_query: {}", args.query);
            self.read_graph_query(args).await
        } else if tool_name == GetGraphSchemaTool::tool_name() {
            serde_json::from_value::<GetGraphSchemaTool>(arguments).map_err(CallToolError::new)?;
            self.get_graph_schema().await
        } else {
            return Err(CallToolError::unknown_tool(tool_name));
        };

        match outcome {
            Ok(text) => Ok(CallToolResult::text_content(vec![TextContent::from(text)])),
            Err(message) => {
                tracing::error!("tool '{tool_name}' failed: {message}");
                Err(CallToolError::new(std::io::Error::other(message)))
            }
        }
    }
}
