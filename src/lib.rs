//! # bookgraph-agent
//!
//! A demo service contrasting three ways of querying a graph-structured
//! book-review dataset:
//!
//! 1. **Direct retrieval** — a fixed catalog of parameterized Cypher queries
//!    behind plain HTTP endpoints.
//! 2. **Agent with a fixed tool set** — an AI agent calling the same catalog
//!    (plus semantic search and a two-stage GraphRAG pipeline) through
//!    statically registered tools.
//! 3. **Agent with discovered tools** — an AI agent calling tools dynamically
//!    discovered from an MCP endpoint, including an arbitrary-query tool.
//!
//! The hard parts — graph traversal, similarity search, language-model
//! orchestration, protocol discovery — are delegated to `FalkorDB`, the
//! `genai` crate, and `rust-mcp-sdk`. This crate is the composition layer:
//! a handful of query strings, a service exposing them as tools, and a
//! façade wiring tools into a chat client.
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bookgraph_agent::catalog::GraphCatalog;
//! use bookgraph_agent::graph::GraphStore;
//! use bookgraph_agent::service::RetrievalService;
//! use bookgraph_agent::vector::FulltextReviewIndex;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let store = GraphStore::connect("falkor://127.0.0.1:6379", "books").await?;
//!     let service = RetrievalService::new(
//!         Arc::new(GraphCatalog::new(store.clone())),
//!         Arc::new(FulltextReviewIndex::new(store)),
//!     );
//!
//!     let books = service.highly_rated_books().await?;
//!     println!("{} five-star books", books.len());
//!
//!     let themed = service.books_by_theme("seafaring adventure", Some("user-A")).await;
//!     println!("{} themed recommendations", themed.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Server mode
//!
//! With the default `server` feature, `cargo run` starts the HTTP façade
//! (with Swagger UI at `/swagger-ui/`) plus an in-process MCP server whose
//! tools are discovered back into the agent's registry at startup.

// Core modules - always available
pub mod agent;
pub mod catalog;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod graph;
pub mod registry;
pub mod schema;
pub mod service;
pub mod template;
pub mod tools;
pub mod vector;

// Server-specific modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod mcp;

// Re-export commonly used types for easier access
pub use agent::ToolAgent;
pub use domain::{Author, Book, Review};
pub use error::{ApiError, ErrorResponse};
pub use registry::{ToolRegistry, ToolSpec};
pub use service::{RetrievalService, DEFAULT_USER_ID};
