//! Semantic search over review text.
//!
//! The index is an opaque external collaborator: it takes free text and
//! returns a finite ranked sequence of review documents. The shipped
//! implementation runs the graph store's full-text procedure over the
//! `Review.text` attribute; a production deployment would bind an embedding
//! index behind the same trait.

use async_trait::async_trait;
use falkordb::FalkorValue;
use serde::{Deserialize, Serialize};

use crate::graph::{cypher, GraphStore, StoreError};

pub(crate) const DEFAULT_TOP_K: usize = 5;

/// A ranked review document. The id is the **review** id, not a book id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ReviewDoc {
    pub id: String,
    pub text: String,
    pub score: f64,
}

/// Similarity search over review text.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns the top-k documents ranked by similarity to `text`.
    async fn search(
        &self,
        text: &str,
    ) -> Result<Vec<ReviewDoc>, StoreError>;
}

/// Full-text review index backed by the graph store.
#[derive(Clone)]
pub struct FulltextReviewIndex {
    store: GraphStore,
    top_k: usize,
}

impl FulltextReviewIndex {
    #[must_use]
    pub fn new(store: GraphStore) -> Self {
        Self {
            store,
            top_k: DEFAULT_TOP_K,
        }
    }

    #[must_use]
    pub fn with_top_k(
        mut self,
        top_k: usize,
    ) -> Self {
        self.top_k = top_k;
        self
    }
}

#[async_trait]
impl VectorIndex for FulltextReviewIndex {
    async fn search(
        &self,
        text: &str,
    ) -> Result<Vec<ReviewDoc>, StoreError> {
        let rows = self.store.ro_query(&search_query(text, self.top_k)).await?;

        let docs = rows
            .iter()
            .filter_map(|row| {
                let FalkorValue::String(id) = row.first()? else {
                    return None;
                };
                let doc_text = match row.get(1) {
                    Some(FalkorValue::String(t)) => t.clone(),
                    _ => String::new(),
                };
                let score = match row.get(2) {
                    Some(FalkorValue::F64(s)) => *s,
                    _ => 0.0,
                };
                Some(ReviewDoc {
                    id: id.clone(),
                    text: doc_text,
                    score,
                })
            })
            .collect();

        Ok(docs)
    }
}

pub(crate) fn search_query(
    text: &str,
    top_k: usize,
) -> String {
    let needle = cypher::str_literal(text);
    format!(
        "CALL db.idx.fulltext.queryNodes('Review', {needle}) YIELD node, score \
         RETURN node.id, node.text, score \
         ORDER BY score DESC \
         LIMIT {top_k}"
    )
}
