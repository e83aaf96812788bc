//! Dynamic tool discovery over MCP.
//!
//! Queries a protocol endpoint for its currently available tools and wraps
//! each one as a registry [`ToolSpec`] whose handler forwards the call back
//! over the protocol. The endpoint's answer is authoritative; reaching it is
//! not guaranteed and a failure here disables only the dynamic variant of
//! the façade.

use std::sync::Arc;

use async_trait::async_trait;
use rust_mcp_sdk::error::SdkResult;
use rust_mcp_sdk::mcp_client::{client_runtime, ClientHandler, ClientRuntime};
use rust_mcp_sdk::schema::{
    CallToolRequestParams, ClientCapabilities, ContentBlock, Implementation, InitializeRequestParams,
    LATEST_PROTOCOL_VERSION,
};
use rust_mcp_sdk::{ClientSseTransport, ClientSseTransportOptions, McpClient};
use serde_json::Value;

use crate::registry::{ToolError, ToolHandler, ToolSpec};

struct DiscoveryClientHandler;

#[async_trait]
impl ClientHandler for DiscoveryClientHandler {}

/// Connects to the MCP endpoint and returns one [`ToolSpec`] per tool it
/// currently advertises.
///
/// # Errors
///
/// Returns an error if the endpoint is unreachable, the handshake fails, or
/// the tool listing fails.
pub async fn discover_tools(server_url: &str) -> SdkResult<Vec<ToolSpec>> {
    let client_details = InitializeRequestParams {
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "bookgraph-agent".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: Some("BookGraph Agent".to_string()),
        },
        protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
    };

    let transport = ClientSseTransport::new(server_url, ClientSseTransportOptions::default())?;
    let client = client_runtime::create_client(client_details, transport, DiscoveryClientHandler);
    client.clone().start().await?;

    let listed = client.list_tools(None).await?;
    tracing::info!("discovered {} MCP tool(s) from {server_url}", listed.tools.len());

    let specs = listed
        .tools
        .into_iter()
        .map(|tool| {
            let parameters = serde_json::to_value(&tool.input_schema)
                .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
            let handler = Arc::new(McpToolHandler {
                client: client.clone(),
                name: tool.name.clone(),
            });
            ToolSpec::new(tool.name, tool.description.unwrap_or_default(), parameters, handler)
        })
        .collect();

    Ok(specs)
}

/// Forwards a registry dispatch to the remote MCP tool.
struct McpToolHandler {
    client: Arc<ClientRuntime>,
    name: String,
}

#[async_trait]
impl ToolHandler for McpToolHandler {
    async fn call(
        &self,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        let arguments = match arguments {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(ToolError::InvalidArguments(format!(
                    "expected object arguments, got: {other}"
                )));
            }
        };

        let result = self
            .client
            .call_tool(CallToolRequestParams {
                name: self.name.clone(),
                arguments,
            })
            .await
            .map_err(|e| ToolError::Execution(format!("mcp tool call failed: {e}")))?;

        let mut text = String::new();
        for block in result.content {
            if let ContentBlock::TextContent(content) = block {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&content.text);
            }
        }

        Ok(Value::String(text))
    }
}
