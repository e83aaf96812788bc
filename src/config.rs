//! Server configuration from environment variables.
//!
//! Loaded once at startup, after `dotenvy` has populated the environment
//! from a `.env` file when present.

/// Runtime configuration with demo-friendly defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Graph store connection string, e.g. `falkor://127.0.0.1:6379`.
    pub falkordb_connection: String,
    /// Name of the graph holding books, authors, reviews and users.
    pub graph_name: String,
    /// Chat model identifier for the agent driver.
    pub model: String,
    /// API key for the chat provider; provider env vars apply when absent.
    pub api_key: Option<String>,
    /// Port of the HTTP façade.
    pub http_port: u16,
    /// Port of the in-process MCP server.
    pub mcp_port: u16,
    /// Discovery endpoint queried for the dynamic tool set.
    pub mcp_server_url: String,
    /// Result cap of the semantic review search.
    pub search_top_k: usize,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let mcp_port = port_var("MCP_PORT", 8081);
        let mcp_server_url =
            std::env::var("MCP_SERVER_URL").unwrap_or_else(|_| format!("http://127.0.0.1:{mcp_port}/sse"));

        Self {
            falkordb_connection: std::env::var("FALKORDB_CONNECTION")
                .unwrap_or_else(|_| "falkor://127.0.0.1:6379".to_string()),
            graph_name: std::env::var("GRAPH_NAME").unwrap_or_else(|_| "books".to_string()),
            model: std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            api_key: std::env::var("DEFAULT_KEY").ok(),
            http_port: port_var("HTTP_PORT", 8080),
            mcp_port,
            mcp_server_url,
            search_top_k: std::env::var("SEARCH_TOP_K")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(crate::vector::DEFAULT_TOP_K),
        }
    }
}

fn port_var(
    name: &str,
    default: u16,
) -> u16 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
