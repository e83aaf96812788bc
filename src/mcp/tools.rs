use rust_mcp_sdk::macros::{mcp_tool, JsonSchema};
use serde::{Deserialize, Serialize};

#[mcp_tool(
    name = "read_graph_query",
    description = "Execute an arbitrary read-only Cypher query against the book-review graph and return the matching rows.

The graph contains:
- (:Book {book_id, title, isbn, isbn13, publication_year, average_rating, num_pages, ratings_count})
- (:Author {author_id, name})
- (:Review {id, text, rating, date_updated})
- (:User {user_id})

Relationships:
- (Author)-[:AUTHORED]->(Book)
- (Review)-[:WRITTEN_FOR]->(Book)
- (User)-[:PUBLISHED]->(Review)

Use the get_graph_schema tool first when unsure about labels or property names.
Only read clauses are expected (MATCH / WHERE / RETURN / ORDER BY / LIMIT)."
)]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReadGraphQueryTool {
    /// The Cypher query to execute against the book-review graph.
    ///
    /// Required: Yes
    /// Type: String
    pub query: String,
}

#[mcp_tool(
    name = "get_graph_schema",
    description = "Discover the schema of the book-review graph: node labels with their sampled property names and types, plus relationship types. Returns the schema as JSON. Call this before read_graph_query when unsure how the data is shaped."
)]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetGraphSchemaTool {}
