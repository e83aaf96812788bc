use std::time::Duration;

use rust_mcp_sdk::mcp_server::{HyperServerOptions, hyper_server};

use crate::graph::GraphStore;
use crate::mcp::server_handler::BookGraphServerHandler;
use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, LATEST_PROTOCOL_VERSION, ServerCapabilities, ServerCapabilitiesTools,
};

use rust_mcp_sdk::error::SdkResult;

/// Run the MCP server exposing the book-review graph.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a runtime error.
pub async fn run_mcp_server(
    port: u16,
    store: GraphStore,
) -> SdkResult<()> {
    let server_details = InitializeResult {
        server_info: Implementation {
            name: "BookGraph MCP Server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: Some("BookGraph MCP Server".to_string()),
        },
        capabilities: ServerCapabilities {
            // tools only; the graph is read-only and small enough not to page
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            ..Default::default()
        },
        meta: None,
        instructions: Some(
            "BookGraph MCP Server

Provides read access to a book-review graph through MCP tools.

TOOLS:
- get_graph_schema: returns the graph schema (labels, property types, relationship types) as JSON
- read_graph_query: executes an arbitrary read-only Cypher query and returns the rows

RECOMMENDED WORKFLOW:
1. Call get_graph_schema to learn the labels and property names
2. Formulate a Cypher query against that schema
3. Call read_graph_query with the query"
                .to_string(),
        ),
        protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
    };

    let handler = BookGraphServerHandler::new(store);

    tracing::info!("starting MCP server on 0.0.0.0:{}", port);

    let server = hyper_server::create_server(
        server_details,
        handler,
        HyperServerOptions {
            host: "0.0.0.0".to_string(),
            port,
            ping_interval: Duration::from_secs(5),
            ..Default::default()
        },
    );

    server.start().await?;

    Ok(())
}
