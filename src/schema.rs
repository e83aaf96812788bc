//! Graph schema discovery.
//!
//! Produces a compact description of the graph (node labels with sampled
//! property types, plus relationship types) for the MCP `get_graph_schema`
//! tool, so an agent can formulate sensible arbitrary queries.

use falkordb::FalkorValue;
use serde::{Deserialize, Serialize};

use crate::graph::{GraphStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum::EnumString, strum::Display)]
pub enum PropertyType {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Map,
    Point,
    Vector,
    Null,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: PropertyType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSchema {
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertySchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSchema {
    pub labels: Vec<LabelSchema>,
    pub relationship_types: Vec<String>,
}

impl std::fmt::Display for GraphSchema {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "schema with {} labels and {} relationship types",
            self.labels.len(),
            self.relationship_types.len()
        )
    }
}

impl GraphSchema {
    /// Discovers the schema by listing labels and relationship types, then
    /// sampling property keys and types per label.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the discovery queries fails.
    pub async fn discover(
        store: &GraphStore,
        sample_size: usize,
    ) -> Result<Self, StoreError> {
        let mut labels = Vec::new();
        for label in first_column_strings(&store.ro_query("CALL db.labels()").await?) {
            let properties = Self::sample_properties(store, &label, sample_size).await?;
            labels.push(LabelSchema { label, properties });
        }

        let relationship_types = first_column_strings(&store.ro_query("CALL db.relationshipTypes()").await?);

        Ok(Self {
            labels,
            relationship_types,
        })
    }

    async fn sample_properties(
        store: &GraphStore,
        label: &str,
        sample_size: usize,
    ) -> Result<Vec<PropertySchema>, StoreError> {
        // Label names come from db.labels(), not from user input.
        let query = format!(
            "MATCH (n:{label}) WITH n LIMIT {sample_size} \
             UNWIND [k IN keys(n) | [k, typeof(n[k])]] AS kt \
             RETURN DISTINCT kt ORDER BY kt[0]"
        );

        let rows = store.ro_query(&query).await?;
        let mut properties = Vec::new();
        for row in &rows {
            let Some(FalkorValue::Array(kt)) = row.first() else {
                continue;
            };
            let (Some(FalkorValue::String(name)), Some(FalkorValue::String(type_name))) = (kt.first(), kt.get(1))
            else {
                continue;
            };
            let r#type = type_name.parse::<PropertyType>().unwrap_or_else(|_| {
                tracing::warn!("unknown property type '{type_name}' on :{label}, defaulting to String");
                PropertyType::String
            });
            properties.push(PropertySchema {
                name: name.clone(),
                r#type,
            });
        }
        Ok(properties)
    }
}

fn first_column_strings(rows: &[Vec<FalkorValue>]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| match row.first() {
            Some(FalkorValue::String(s)) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_types_parse_from_typeof_names() {
        assert_eq!("String".parse::<PropertyType>().unwrap(), PropertyType::String);
        assert_eq!("Integer".parse::<PropertyType>().unwrap(), PropertyType::Integer);
        assert_eq!("Float".parse::<PropertyType>().unwrap(), PropertyType::Float);
        assert!("Unknown".parse::<PropertyType>().is_err());
    }

    #[test]
    fn first_column_skips_non_strings() {
        let rows = vec![
            vec![FalkorValue::String("Book".to_string())],
            vec![FalkorValue::I64(7)],
            vec![FalkorValue::String("Author".to_string())],
        ];
        assert_eq!(first_column_strings(&rows), vec!["Book", "Author"]);
    }

    #[test]
    fn schema_serializes_without_empty_properties() {
        let schema = GraphSchema {
            labels: vec![LabelSchema {
                label: "User".to_string(),
                properties: Vec::new(),
            }],
            relationship_types: vec!["PUBLISHED".to_string()],
        };
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("\"User\""));
        assert!(!json.contains("\"properties\""));
    }
}
