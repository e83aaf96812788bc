//! Graph store access.
//!
//! A thin wrapper around the `FalkorDB` async client. All queries in this crate
//! are read-only and run through [`GraphStore::ro_query`]; parameter values are
//! rendered into the query text as escaped Cypher literals via the [`cypher`]
//! helpers.

use std::fmt;
use std::sync::Arc;

use falkordb::{FalkorAsyncClient, FalkorClientBuilder, FalkorConnectionInfo, FalkorValue};

/// Failure of the underlying graph store (connection, query, or protocol).
#[derive(Debug, Clone)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "graph store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Process-owned connection to one graph. Cheap to clone and safe to share
/// across concurrent requests; no per-request locking is introduced here.
#[derive(Clone)]
pub struct GraphStore {
    client: Arc<FalkorAsyncClient>,
    graph_name: String,
}

impl GraphStore {
    /// Connects to the graph store and selects the named graph for all
    /// subsequent queries.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the client
    /// cannot be built.
    pub async fn connect(
        connection: &str,
        graph_name: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let connection_info: FalkorConnectionInfo = connection
            .try_into()
            .map_err(|e| StoreError(format!("invalid connection info: {e}")))?;

        let client = FalkorClientBuilder::new_async()
            .with_connection_info(connection_info)
            .build()
            .await
            .map_err(|e| StoreError(format!("failed to build client: {e}")))?;

        Ok(Self {
            client: Arc::new(client),
            graph_name: graph_name.into(),
        })
    }

    /// Executes a read-only query and collects all result rows.
    ///
    /// # Errors
    ///
    /// Returns an error if query execution fails.
    pub async fn ro_query(
        &self,
        query: &str,
    ) -> Result<Vec<Vec<FalkorValue>>, StoreError> {
        tracing::debug!("executing read query on '{}': {}", self.graph_name, query);

        let mut graph = self.client.select_graph(&self.graph_name);
        let result = graph
            .ro_query(query)
            .execute()
            .await
            .map_err(|e| StoreError(format!("query execution failed: {e}")))?;

        let mut rows = Vec::new();
        for record in result.data {
            rows.push(record);
        }
        Ok(rows)
    }
}

/// Rendering of parameter values as Cypher literals.
pub mod cypher {
    /// Renders a string value as a single-quoted Cypher literal.
    #[must_use]
    pub fn str_literal(value: &str) -> String {
        let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
        format!("'{escaped}'")
    }

    /// Renders a list of string values as a Cypher list literal.
    #[must_use]
    pub fn str_list_literal(values: &[String]) -> String {
        let items: Vec<String> = values.iter().map(|v| str_literal(v)).collect();
        format!("[{}]", items.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::cypher;

    #[test]
    fn plain_string_literal() {
        assert_eq!(cypher::str_literal("user123"), "'user123'");
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(cypher::str_literal("O'Brien"), "'O\\'Brien'");
    }

    #[test]
    fn backslashes_are_escaped_before_quotes() {
        assert_eq!(cypher::str_literal(r"a\'b"), r"'a\\\'b'");
    }

    #[test]
    fn list_literal() {
        let ids = vec!["r1".to_string(), "r'2".to_string()];
        assert_eq!(cypher::str_list_literal(&ids), r"['r1', 'r\'2']");
    }

    #[test]
    fn empty_list_literal() {
        assert_eq!(cypher::str_list_literal(&[]), "[]");
    }
}
