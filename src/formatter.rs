//! Compact formatting of raw query rows.
//!
//! Results of the arbitrary-query MCP tool are rendered as text for the
//! calling model: familiar Cypher-like syntax for nodes and edges, minimal
//! whitespace, numbered rows.

use falkordb::FalkorValue;
use std::fmt::Write;

/// Formats query rows in a compact, model-friendly text form.
#[must_use]
pub fn format_rows(rows: &[Vec<FalkorValue>]) -> String {
    if rows.is_empty() {
        return "No results returned.".to_string();
    }

    if let [row] = rows {
        return format_row(row);
    }

    let mut out = String::new();
    for (idx, row) in rows.iter().enumerate() {
        writeln!(out, "{}. {}", idx + 1, format_row(row)).unwrap();
    }
    out.trim_end().to_string()
}

fn format_row(row: &[FalkorValue]) -> String {
    if let [value] = row {
        return format_value(value);
    }
    let fields: Vec<String> = row.iter().map(format_value).collect();
    format!("[{}]", fields.join(", "))
}

fn format_value(value: &FalkorValue) -> String {
    match value {
        FalkorValue::Bool(b) => b.to_string(),
        FalkorValue::I64(i) => i.to_string(),
        FalkorValue::F64(f) => f.to_string(),
        FalkorValue::String(s) => format!("\"{s}\""),
        FalkorValue::Node(node) => {
            let labels = if node.labels.is_empty() {
                String::new()
            } else {
                format!(":{}", node.labels.join(":"))
            };
            format!("({labels}{})", format_properties(&node.properties))
        }
        FalkorValue::Edge(edge) => {
            format!("-[:{}{}]-", edge.relationship_type, format_properties(&edge.properties))
        }
        FalkorValue::Array(items) => {
            let elements: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", elements.join(", "))
        }
        other => format!("{other:?}"),
    }
}

fn format_properties(properties: &std::collections::HashMap<String, FalkorValue>) -> String {
    if properties.is_empty() {
        return String::new();
    }
    let mut pairs: Vec<(&String, &FalkorValue)> = properties.iter().collect();
    pairs.sort_by_key(|(k, _)| k.as_str());
    let rendered: Vec<String> = pairs
        .into_iter()
        .map(|(k, v)| format!("{k}: {}", format_value(v)))
        .collect();
    format!(" {{{}}}", rendered.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use falkordb::{Edge, Node};
    use std::collections::HashMap;

    #[test]
    fn empty_rows() {
        assert_eq!(format_rows(&[]), "No results returned.");
    }

    #[test]
    fn single_scalar_row() {
        assert_eq!(format_rows(&[vec![FalkorValue::I64(3)]]), "3");
    }

    #[test]
    fn single_row_with_multiple_fields() {
        let rows = vec![vec![
            FalkorValue::String("Dune".to_string()),
            FalkorValue::F64(4.2),
            FalkorValue::Bool(true),
        ]];
        assert_eq!(format_rows(&rows), "[\"Dune\", 4.2, true]");
    }

    #[test]
    fn multiple_rows_are_numbered() {
        let rows = vec![vec![FalkorValue::I64(1)], vec![FalkorValue::I64(2)]];
        assert_eq!(format_rows(&rows), "1. 1\n2. 2");
    }

    #[test]
    fn node_renders_labels_and_sorted_properties() {
        let mut properties = HashMap::new();
        properties.insert("title".to_string(), FalkorValue::String("Dune".to_string()));
        properties.insert("book_id".to_string(), FalkorValue::String("b1".to_string()));
        let node = Node {
            entity_id: 1,
            labels: vec!["Book".to_string()],
            properties,
        };

        assert_eq!(
            format_rows(&[vec![FalkorValue::Node(node)]]),
            "(:Book {book_id: \"b1\", title: \"Dune\"})"
        );
    }

    #[test]
    fn edge_renders_relationship_type() {
        let edge = Edge {
            entity_id: 1,
            relationship_type: "WRITTEN_FOR".to_string(),
            src_node_id: 1,
            dst_node_id: 2,
            properties: HashMap::new(),
        };
        assert_eq!(format_rows(&[vec![FalkorValue::Edge(edge)]]), "-[:WRITTEN_FOR]-");
    }

    #[test]
    fn arrays_render_inline() {
        let value = FalkorValue::Array(vec![FalkorValue::I64(1), FalkorValue::I64(2)]);
        assert_eq!(format_rows(&[vec![value]]), "[1, 2]");
    }
}
