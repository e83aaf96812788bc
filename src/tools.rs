//! The statically declared tool set.
//!
//! Five tools wrapping the retrieval service, enumerated at process start and
//! never changing at runtime. Descriptions are what the agent driver sees
//! when selecting operations.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::registry::{ToolError, ToolHandler, ToolRegistry, ToolSpec};
use crate::service::RetrievalService;

/// Registers the fixed tool set.
///
/// # Errors
///
/// Returns an error if a tool name is already taken, which indicates a
/// duplicate registration bug.
pub fn register_static_tools(
    registry: &mut ToolRegistry,
    service: Arc<RetrievalService>,
) -> Result<(), ToolError> {
    registry.register_static(ToolSpec::new(
        "get_highly_rated_books",
        "Get books rated highly (5 stars). Returns a list of book objects.",
        json!({ "type": "object", "properties": {} }),
        Arc::new(HighlyRatedBooks {
            service: service.clone(),
        }),
    ))?;

    registry.register_static(ToolSpec::new(
        "get_quality_recommendations",
        "Get books rated highly (4 or 5 stars) that the user has not read. Returns a list of book objects.",
        json!({
            "type": "object",
            "properties": {
                "user_id": { "type": "string", "description": "Id of the user asking for recommendations" }
            },
            "required": ["user_id"]
        }),
        Arc::new(QualityRecommendations {
            service: service.clone(),
        }),
    ))?;

    registry.register_static(ToolSpec::new(
        "count_books_read",
        "Count the total number of books a user has read. Returns a count.",
        json!({
            "type": "object",
            "properties": {
                "user_id": { "type": "string", "description": "Id of the user" }
            },
            "required": ["user_id"]
        }),
        Arc::new(CountBooksRead {
            service: service.clone(),
        }),
    ))?;

    registry.register_static(ToolSpec::new(
        "search_reviews_by_description",
        "Find reviews similar to a given description or theme using semantic search. \
         Use this when the user is searching for book reviews with general themes or topics. \
         Returns a list of review documents.",
        json!({
            "type": "object",
            "properties": {
                "description": { "type": "string", "description": "Free-text theme or description to search for" }
            },
            "required": ["description"]
        }),
        Arc::new(SearchReviews {
            service: service.clone(),
        }),
    ))?;

    registry.register_static(ToolSpec::new(
        "search_books_by_theme",
        "Find books semantically similar to the user's topics or themes, combining semantic \
         search over reviews with graph relationships. Use this when the user is looking for \
         books matching a theme. Returns a list of book objects.",
        json!({
            "type": "object",
            "properties": {
                "description": { "type": "string", "description": "Free-text theme to search for" },
                "user_id": { "type": "string", "description": "Id of the user; already-read books are excluded" }
            },
            "required": ["description"]
        }),
        Arc::new(SearchBooksByTheme { service }),
    ))?;

    Ok(())
}

fn required_str(
    arguments: &Value,
    field: &str,
) -> Result<String, ToolError> {
    arguments
        .get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing required field '{field}'")))
}

fn optional_str(
    arguments: &Value,
    field: &str,
) -> Option<String> {
    arguments.get(field).and_then(Value::as_str).map(ToString::to_string)
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::Execution(format!("failed to serialize result: {e}")))
}

struct HighlyRatedBooks {
    service: Arc<RetrievalService>,
}

#[async_trait]
impl ToolHandler for HighlyRatedBooks {
    async fn call(
        &self,
        _arguments: Value,
    ) -> Result<Value, ToolError> {
        let books = self
            .service
            .highly_rated_books()
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        to_json(books)
    }
}

struct QualityRecommendations {
    service: Arc<RetrievalService>,
}

#[async_trait]
impl ToolHandler for QualityRecommendations {
    async fn call(
        &self,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        let user_id = required_str(&arguments, "user_id")?;
        let books = self
            .service
            .quality_recommendations(Some(&user_id))
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        to_json(books)
    }
}

struct CountBooksRead {
    service: Arc<RetrievalService>,
}

#[async_trait]
impl ToolHandler for CountBooksRead {
    async fn call(
        &self,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        let user_id = required_str(&arguments, "user_id")?;
        let count = self
            .service
            .count_books_read(Some(&user_id))
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        Ok(json!({ "count": count }))
    }
}

struct SearchReviews {
    service: Arc<RetrievalService>,
}

#[async_trait]
impl ToolHandler for SearchReviews {
    async fn call(
        &self,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        let description = required_str(&arguments, "description")?;
        let docs = self.service.reviews_by_description(&description).await;
        to_json(docs)
    }
}

struct SearchBooksByTheme {
    service: Arc<RetrievalService>,
}

#[async_trait]
impl ToolHandler for SearchBooksByTheme {
    async fn call(
        &self,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        let description = required_str(&arguments, "description")?;
        let user_id = optional_str(&arguments, "user_id");
        let books = self.service.books_by_theme(&description, user_id.as_deref()).await;
        to_json(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{book, doc, MockCatalog, MockIndex};

    fn registry_with(
        catalog: MockCatalog,
        index: MockIndex,
    ) -> ToolRegistry {
        let service = Arc::new(RetrievalService::new(Arc::new(catalog), Arc::new(index)));
        let mut registry = ToolRegistry::new();
        register_static_tools(&mut registry, service).unwrap();
        registry
    }

    #[test]
    fn all_five_tools_register() {
        let registry = registry_with(MockCatalog::default(), MockIndex::default());
        assert_eq!(registry.len(), 5);
        for name in [
            "get_highly_rated_books",
            "get_quality_recommendations",
            "count_books_read",
            "search_reviews_by_description",
            "search_books_by_theme",
        ] {
            assert!(registry.origin(name).is_some(), "missing tool {name}");
        }
    }

    #[tokio::test]
    async fn recommendations_tool_returns_books_json() {
        let registry = registry_with(
            MockCatalog {
                books: vec![book("b1")],
                ..MockCatalog::default()
            },
            MockIndex::default(),
        );

        let result = registry
            .dispatch("get_quality_recommendations", json!({"user_id": "u1"}))
            .await
            .unwrap();
        assert_eq!(result[0]["id"], "b1");
    }

    #[tokio::test]
    async fn count_tool_wraps_the_count() {
        let registry = registry_with(
            MockCatalog {
                count: 3,
                ..MockCatalog::default()
            },
            MockIndex::default(),
        );

        let result = registry
            .dispatch("count_books_read", json!({"user_id": "user-A"}))
            .await
            .unwrap();
        assert_eq!(result["count"], 3);
    }

    #[tokio::test]
    async fn catalog_failure_surfaces_as_execution_error() {
        let registry = registry_with(
            MockCatalog {
                fail: true,
                ..MockCatalog::default()
            },
            MockIndex::default(),
        );

        let err = registry
            .dispatch("get_highly_rated_books", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Execution(_)));
    }

    #[tokio::test]
    async fn semantic_search_failure_yields_empty_json_not_error() {
        let registry = registry_with(
            MockCatalog::default(),
            MockIndex {
                fail: true,
                ..MockIndex::default()
            },
        );

        let result = registry
            .dispatch("search_reviews_by_description", json!({"description": "pirates"}))
            .await
            .unwrap();
        assert_eq!(result, json!([]));
    }

    #[tokio::test]
    async fn theme_tool_accepts_missing_user_id() {
        let registry = registry_with(
            MockCatalog {
                books: vec![book("b1")],
                ..MockCatalog::default()
            },
            MockIndex {
                docs: vec![doc("r1")],
                ..MockIndex::default()
            },
        );

        let result = registry
            .dispatch("search_books_by_theme", json!({"description": "pirates"}))
            .await
            .unwrap();
        assert_eq!(result.as_array().unwrap().len(), 1);
    }
}
