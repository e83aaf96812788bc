//! Read-only projections of the book-review graph.
//!
//! Entities are constructed fresh from query result nodes and have no lifecycle
//! beyond the request that produced them. There is no identity map and no write
//! path in this crate.

use falkordb::{FalkorValue, Node};
use serde::{Deserialize, Serialize};

/// A book aggregate, enriched with its authors and (when the query collects
/// them) its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct Book {
    pub id: String,
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub isbn13: Option<String>,
    pub publication_year: Option<String>,
    pub average_rating: Option<f64>,
    pub num_pages: Option<String>,
    pub ratings_count: Option<i64>,
    pub authors: Vec<Author>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct Author {
    pub id: String,
    pub name: Option<String>,
}

/// A review always denotes exactly one book and one user. The publishing
/// user id is present only when the query collects the `PUBLISHED` side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct Review {
    pub id: String,
    pub text: Option<String>,
    pub rating: Option<i64>,
    pub date_updated: Option<String>,
    pub user_id: Option<String>,
}

impl Book {
    /// Builds a `Book` from a graph node. Returns `None` when the node carries
    /// no `book_id` property.
    #[must_use]
    pub fn from_node(node: &Node) -> Option<Self> {
        Some(Self {
            id: prop_str(node, "book_id")?,
            title: prop_str(node, "title"),
            isbn: prop_str(node, "isbn"),
            isbn13: prop_str(node, "isbn13"),
            publication_year: prop_str(node, "publication_year"),
            average_rating: prop_f64(node, "average_rating"),
            num_pages: prop_str(node, "num_pages"),
            ratings_count: prop_i64(node, "ratings_count"),
            authors: Vec::new(),
            reviews: Vec::new(),
        })
    }
}

impl Author {
    #[must_use]
    pub fn from_node(node: &Node) -> Option<Self> {
        Some(Self {
            id: prop_str(node, "author_id")?,
            name: prop_str(node, "name"),
        })
    }
}

impl Review {
    #[must_use]
    pub fn from_node(node: &Node) -> Option<Self> {
        Some(Self {
            id: prop_str(node, "id")?,
            text: prop_str(node, "text"),
            rating: prop_i64(node, "rating"),
            date_updated: prop_str(node, "date_updated"),
            user_id: None,
        })
    }

    /// Builds a `Review` from a collected query value. Accepts either a bare
    /// review node or a `[review, user]` pair as produced by
    /// `collect([r, u])`.
    #[must_use]
    pub fn from_value(value: &FalkorValue) -> Option<Self> {
        match value {
            FalkorValue::Node(node) => Self::from_node(node),
            FalkorValue::Array(pair) => {
                let FalkorValue::Node(review_node) = pair.first()? else {
                    return None;
                };
                let mut review = Self::from_node(review_node)?;
                if let Some(FalkorValue::Node(user_node)) = pair.get(1) {
                    review.user_id = prop_str(user_node, "user_id");
                }
                Some(review)
            }
            _ => None,
        }
    }
}

/// Extracts all authors from a collected `FalkorValue::Array`.
#[must_use]
pub fn authors_from_value(value: &FalkorValue) -> Vec<Author> {
    let FalkorValue::Array(items) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            FalkorValue::Node(node) => Author::from_node(node),
            _ => None,
        })
        .collect()
}

/// Extracts all reviews from a collected `FalkorValue::Array`.
#[must_use]
pub fn reviews_from_value(value: &FalkorValue) -> Vec<Review> {
    let FalkorValue::Array(items) = value else {
        return Vec::new();
    };
    items.iter().filter_map(Review::from_value).collect()
}

fn prop_str(
    node: &Node,
    key: &str,
) -> Option<String> {
    match node.properties.get(key) {
        Some(FalkorValue::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn prop_f64(
    node: &Node,
    key: &str,
) -> Option<f64> {
    match node.properties.get(key) {
        Some(FalkorValue::F64(f)) => Some(*f),
        #[allow(clippy::cast_precision_loss)]
        Some(FalkorValue::I64(i)) => Some(*i as f64),
        _ => None,
    }
}

fn prop_i64(
    node: &Node,
    key: &str,
) -> Option<i64> {
    match node.properties.get(key) {
        Some(FalkorValue::I64(i)) => Some(*i),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn node(
        label: &str,
        props: Vec<(&str, FalkorValue)>,
    ) -> Node {
        let mut properties = HashMap::new();
        for (key, value) in props {
            properties.insert(key.to_string(), value);
        }
        Node {
            entity_id: 1,
            labels: vec![label.to_string()],
            properties,
        }
    }

    #[test]
    fn book_from_node_maps_properties() {
        let n = node(
            "Book",
            vec![
                ("book_id", FalkorValue::String("b1".to_string())),
                ("title", FalkorValue::String("Dune".to_string())),
                ("average_rating", FalkorValue::F64(4.2)),
                ("ratings_count", FalkorValue::I64(1500)),
            ],
        );

        let book = Book::from_node(&n).unwrap();
        assert_eq!(book.id, "b1");
        assert_eq!(book.title.as_deref(), Some("Dune"));
        assert_eq!(book.average_rating, Some(4.2));
        assert_eq!(book.ratings_count, Some(1500));
        assert!(book.isbn.is_none());
        assert!(book.authors.is_empty());
    }

    #[test]
    fn book_from_node_requires_book_id() {
        let n = node("Book", vec![("title", FalkorValue::String("Dune".to_string()))]);
        assert!(Book::from_node(&n).is_none());
    }

    #[test]
    fn integer_average_rating_is_widened() {
        let n = node(
            "Book",
            vec![
                ("book_id", FalkorValue::String("b1".to_string())),
                ("average_rating", FalkorValue::I64(4)),
            ],
        );
        assert_eq!(Book::from_node(&n).unwrap().average_rating, Some(4.0));
    }

    #[test]
    fn review_from_bare_node_has_no_user() {
        let n = node(
            "Review",
            vec![
                ("id", FalkorValue::String("r1".to_string())),
                ("rating", FalkorValue::I64(5)),
                ("date_updated", FalkorValue::String("Mon Aug 14 13:28:24 2017".to_string())),
            ],
        );

        let review = Review::from_value(&FalkorValue::Node(n)).unwrap();
        assert_eq!(review.id, "r1");
        assert_eq!(review.rating, Some(5));
        assert_eq!(review.date_updated.as_deref(), Some("Mon Aug 14 13:28:24 2017"));
        assert!(review.user_id.is_none());
    }

    #[test]
    fn review_from_pair_carries_user_id() {
        let review_node = node(
            "Review",
            vec![
                ("id", FalkorValue::String("r1".to_string())),
                ("text", FalkorValue::String("loved it".to_string())),
            ],
        );
        let user_node = node("User", vec![("user_id", FalkorValue::String("u1".to_string()))]);

        let pair = FalkorValue::Array(vec![FalkorValue::Node(review_node), FalkorValue::Node(user_node)]);
        let review = Review::from_value(&pair).unwrap();
        assert_eq!(review.user_id.as_deref(), Some("u1"));
        assert_eq!(review.text.as_deref(), Some("loved it"));
    }

    #[test]
    fn collected_authors_skip_non_nodes() {
        let author = node(
            "Author",
            vec![
                ("author_id", FalkorValue::String("a1".to_string())),
                ("name", FalkorValue::String("Frank Herbert".to_string())),
            ],
        );
        let collected = FalkorValue::Array(vec![FalkorValue::Node(author), FalkorValue::I64(7)]);

        let authors = authors_from_value(&collected);
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].name.as_deref(), Some("Frank Herbert"));
    }
}
