pub mod client;
pub mod mcp_server;
pub mod server_handler;
pub mod tools;
