//! The fixed catalog of parameterized read queries.
//!
//! Each operation maps onto one Cypher query against the book-review graph.
//! Catalog operations are fail-closed: a store failure propagates to the
//! caller. An unknown user id is not an error; the store simply matches
//! nothing and the result is empty.

use async_trait::async_trait;
use falkordb::FalkorValue;

use crate::domain::{authors_from_value, reviews_from_value, Book};
use crate::graph::{cypher, GraphStore, StoreError};

/// The catalog's callable surface. A trait seam so the service layer can be
/// exercised against mocks.
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// Up to 10 books with at least one 5-star review, most recently
    /// reviewed first, enriched with authors and the matching reviews.
    async fn five_star_books(&self) -> Result<Vec<Book>, StoreError>;

    /// Up to 3 books with an average rating of at least 4.0 that the given
    /// user has not reviewed, enriched with authors.
    async fn books_not_read(
        &self,
        user_id: &str,
    ) -> Result<Vec<Book>, StoreError>;

    /// Distinct count of books the given user has published a review for.
    async fn count_books_read(
        &self,
        user_id: &str,
    ) -> Result<u64, StoreError>;

    /// Books linked to any review in `review_ids`, excluding books the given
    /// user has already reviewed, enriched with authors and the seed reviews.
    async fn graph_rag_recommendations(
        &self,
        review_ids: &[String],
        user_id: &str,
    ) -> Result<Vec<Book>, StoreError>;
}

/// Catalog backed by the graph store.
#[derive(Clone)]
pub struct GraphCatalog {
    store: GraphStore,
}

impl GraphCatalog {
    #[must_use]
    pub fn new(store: GraphStore) -> Self {
        Self { store }
    }

    async fn query_books(
        &self,
        query: &str,
    ) -> Result<Vec<Book>, StoreError> {
        let rows = self.store.ro_query(query).await?;
        Ok(rows.iter().filter_map(|row| book_from_row(row)).collect())
    }
}

#[async_trait]
impl BookCatalog for GraphCatalog {
    async fn five_star_books(&self) -> Result<Vec<Book>, StoreError> {
        self.query_books(&five_star_query()).await
    }

    async fn books_not_read(
        &self,
        user_id: &str,
    ) -> Result<Vec<Book>, StoreError> {
        self.query_books(&books_not_read_query(user_id)).await
    }

    async fn count_books_read(
        &self,
        user_id: &str,
    ) -> Result<u64, StoreError> {
        let rows = self.store.ro_query(&count_books_read_query(user_id)).await?;
        let count = rows
            .first()
            .and_then(|row| row.first())
            .and_then(|value| match value {
                FalkorValue::I64(n) => u64::try_from(*n).ok(),
                _ => None,
            })
            .unwrap_or(0);
        Ok(count)
    }

    async fn graph_rag_recommendations(
        &self,
        review_ids: &[String],
        user_id: &str,
    ) -> Result<Vec<Book>, StoreError> {
        let Some(query) = graph_rag_query(review_ids, user_id) else {
            return Ok(Vec::new());
        };
        self.query_books(&query).await
    }
}

/// Maps a `(book, authors, reviews?)` result row onto a [`Book`].
fn book_from_row(row: &[FalkorValue]) -> Option<Book> {
    let FalkorValue::Node(book_node) = row.first()? else {
        return None;
    };
    let mut book = Book::from_node(book_node)?;
    if let Some(authors) = row.get(1) {
        book.authors = authors_from_value(authors);
    }
    if let Some(reviews) = row.get(2) {
        book.reviews = reviews_from_value(reviews);
    }
    Some(book)
}

pub(crate) fn five_star_query() -> String {
    "MATCH (u:User)-[:PUBLISHED]->(r:Review)-[:WRITTEN_FOR]->(b:Book) \
     WHERE r.rating = 5 \
     WITH b, collect([r, u]) AS reviews, max(r.date_updated) AS latest \
     ORDER BY latest DESC \
     LIMIT 10 \
     OPTIONAL MATCH (b)<-[:AUTHORED]-(a:Author) \
     RETURN b, collect(DISTINCT a) AS authors, reviews"
        .to_string()
}

pub(crate) fn books_not_read_query(user_id: &str) -> String {
    let user = cypher::str_literal(user_id);
    format!(
        "MATCH (b:Book)<-[:AUTHORED]-(a:Author) \
         WHERE b.average_rating >= 4 \
         AND NOT (:User {{user_id: {user}}})-[:PUBLISHED]->(:Review)-[:WRITTEN_FOR]->(b) \
         WITH b, collect(a) AS authors \
         LIMIT 3 \
         RETURN b, authors"
    )
}

pub(crate) fn count_books_read_query(user_id: &str) -> String {
    let user = cypher::str_literal(user_id);
    format!(
        "MATCH (:User {{user_id: {user}}})-[:PUBLISHED]->(:Review)-[:WRITTEN_FOR]->(b:Book) \
         RETURN count(DISTINCT b)"
    )
}

/// Returns `None` for an empty seed set; there is nothing to expand and the
/// store is not consulted.
pub(crate) fn graph_rag_query(
    review_ids: &[String],
    user_id: &str,
) -> Option<String> {
    if review_ids.is_empty() {
        return None;
    }
    let ids = cypher::str_list_literal(review_ids);
    let user = cypher::str_literal(user_id);
    Some(format!(
        "MATCH (b:Book)<-[:WRITTEN_FOR]-(r:Review) \
         WHERE r.id IN {ids} \
         AND NOT (:User {{user_id: {user}}})-[:PUBLISHED]->(:Review)-[:WRITTEN_FOR]->(b) \
         OPTIONAL MATCH (b)<-[:AUTHORED]-(a:Author) \
         RETURN b, collect(DISTINCT a) AS authors, collect(DISTINCT r) AS reviews"
    ))
}
