//! The retrieval service.
//!
//! Presents the query catalog plus derived semantic retrieval as uniformly
//! callable operations. The failure policy is encoded in the signatures:
//! catalog passthroughs are fail-closed (`Result`), the two semantic
//! operations are fail-open (infallible, logging and collapsing failures to
//! an empty result so a single retrieval failure does not abort the
//! enclosing agent turn). No operation retries.

use std::sync::Arc;

use crate::catalog::BookCatalog;
use crate::domain::Book;
use crate::graph::StoreError;
use crate::vector::{ReviewDoc, VectorIndex};

/// Placeholder user applied when a caller supplies no user id. A demo
/// convenience, not production semantics.
pub const DEFAULT_USER_ID: &str = "8842281e1d1347389f2ab93d60773d4d";

pub struct RetrievalService {
    catalog: Arc<dyn BookCatalog>,
    index: Arc<dyn VectorIndex>,
}

impl RetrievalService {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn BookCatalog>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self { catalog, index }
    }

    /// Catalog passthrough: books with at least one 5-star review.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged (fail-closed).
    pub async fn highly_rated_books(&self) -> Result<Vec<Book>, StoreError> {
        self.catalog.five_star_books().await
    }

    /// Catalog passthrough: well-rated books the user has not read.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged (fail-closed).
    pub async fn quality_recommendations(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<Book>, StoreError> {
        self.catalog.books_not_read(effective_user(user_id)).await
    }

    /// Catalog passthrough: how many distinct books the user has reviewed.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged (fail-closed).
    pub async fn count_books_read(
        &self,
        user_id: Option<&str>,
    ) -> Result<u64, StoreError> {
        self.catalog.count_books_read(effective_user(user_id)).await
    }

    /// Semantic search over review text. Fail-open: an index failure is
    /// logged and yields an empty result.
    pub async fn reviews_by_description(
        &self,
        description: &str,
    ) -> Vec<ReviewDoc> {
        match self.index.search(description).await {
            Ok(docs) => {
                tracing::info!("semantic search returned {} review documents", docs.len());
                docs
            }
            Err(e) => {
                tracing::error!("semantic review search failed, returning empty result: {e}");
                Vec::new()
            }
        }
    }

    /// Two-stage theme search: semantic review search, then graph expansion
    /// of the seed reviews. Fail-open in both stages.
    ///
    /// Stage 2 strictly follows stage 1; when stage 1 returns nothing the
    /// graph is not consulted at all.
    pub async fn books_by_theme(
        &self,
        description: &str,
        user_id: Option<&str>,
    ) -> Vec<Book> {
        let docs = self.reviews_by_description(description).await;
        if docs.is_empty() {
            return Vec::new();
        }

        // The document ids are review ids, not book ids.
        let review_ids: Vec<String> = docs.into_iter().map(|doc| doc.id).collect();
        tracing::info!("expanding {} seed reviews through the graph", review_ids.len());

        match self
            .catalog
            .graph_rag_recommendations(&review_ids, effective_user(user_id))
            .await
        {
            Ok(books) => books,
            Err(e) => {
                tracing::error!("graph expansion failed, returning empty result: {e}");
                Vec::new()
            }
        }
    }
}

fn effective_user(user_id: Option<&str>) -> &str {
    match user_id {
        Some(id) if !id.is_empty() => id,
        _ => DEFAULT_USER_ID,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted catalog recording graph-expansion invocations.
    #[derive(Default)]
    pub(crate) struct MockCatalog {
        pub books: Vec<Book>,
        pub count: u64,
        pub fail: bool,
        pub graph_rag_calls: AtomicUsize,
        pub last_review_ids: Mutex<Vec<String>>,
        pub last_user_id: Mutex<Option<String>>,
    }

    impl MockCatalog {
        fn outcome(&self) -> Result<Vec<Book>, StoreError> {
            if self.fail {
                Err(StoreError("mock store failure".to_string()))
            } else {
                Ok(self.books.clone())
            }
        }
    }

    #[async_trait]
    impl BookCatalog for MockCatalog {
        async fn five_star_books(&self) -> Result<Vec<Book>, StoreError> {
            self.outcome()
        }

        async fn books_not_read(
            &self,
            user_id: &str,
        ) -> Result<Vec<Book>, StoreError> {
            *self.last_user_id.lock().unwrap() = Some(user_id.to_string());
            self.outcome()
        }

        async fn count_books_read(
            &self,
            user_id: &str,
        ) -> Result<u64, StoreError> {
            *self.last_user_id.lock().unwrap() = Some(user_id.to_string());
            if self.fail {
                return Err(StoreError("mock store failure".to_string()));
            }
            Ok(self.count)
        }

        async fn graph_rag_recommendations(
            &self,
            review_ids: &[String],
            user_id: &str,
        ) -> Result<Vec<Book>, StoreError> {
            self.graph_rag_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_review_ids.lock().unwrap() = review_ids.to_vec();
            *self.last_user_id.lock().unwrap() = Some(user_id.to_string());
            self.outcome()
        }
    }

    /// Scripted vector index.
    #[derive(Default)]
    pub(crate) struct MockIndex {
        pub docs: Vec<ReviewDoc>,
        pub fail: bool,
    }

    #[async_trait]
    impl VectorIndex for MockIndex {
        async fn search(
            &self,
            _text: &str,
        ) -> Result<Vec<ReviewDoc>, StoreError> {
            if self.fail {
                Err(StoreError("mock index failure".to_string()))
            } else {
                Ok(self.docs.clone())
            }
        }
    }

    pub(crate) fn book(id: &str) -> Book {
        Book {
            id: id.to_string(),
            title: None,
            isbn: None,
            isbn13: None,
            publication_year: None,
            average_rating: None,
            num_pages: None,
            ratings_count: None,
            authors: Vec::new(),
            reviews: Vec::new(),
        }
    }

    pub(crate) fn doc(id: &str) -> ReviewDoc {
        ReviewDoc {
            id: id.to_string(),
            text: format!("review {id}"),
            score: 0.9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{book, doc, MockCatalog, MockIndex};
    use super::*;
    use std::sync::atomic::Ordering;

    fn service(
        catalog: MockCatalog,
        index: MockIndex,
    ) -> (Arc<MockCatalog>, RetrievalService) {
        let catalog = Arc::new(catalog);
        let svc = RetrievalService::new(catalog.clone(), Arc::new(index));
        (catalog, svc)
    }

    #[tokio::test]
    async fn catalog_failure_propagates_for_recommendations() {
        let (_, svc) = service(
            MockCatalog {
                fail: true,
                ..MockCatalog::default()
            },
            MockIndex::default(),
        );

        assert!(svc.quality_recommendations(Some("u1")).await.is_err());
    }

    #[tokio::test]
    async fn index_failure_collapses_to_empty() {
        let (catalog, svc) = service(
            MockCatalog::default(),
            MockIndex {
                fail: true,
                ..MockIndex::default()
            },
        );

        let docs = svc.reviews_by_description("seafaring adventure").await;
        assert!(docs.is_empty());
        // Stage 2 must not run when stage 1 failed.
        let books = svc.books_by_theme("seafaring adventure", Some("u1")).await;
        assert!(books.is_empty());
        assert_eq!(catalog.graph_rag_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_stage_one_skips_graph_expansion() {
        let (catalog, svc) = service(MockCatalog::default(), MockIndex::default());

        let books = svc.books_by_theme("anything", None).await;
        assert!(books.is_empty());
        assert_eq!(catalog.graph_rag_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn theme_search_passes_review_ids_to_graph_expansion() {
        let (catalog, svc) = service(
            MockCatalog {
                books: vec![book("b1"), book("b2")],
                ..MockCatalog::default()
            },
            MockIndex {
                docs: vec![doc("r1"), doc("r2")],
                ..MockIndex::default()
            },
        );

        let books = svc.books_by_theme("space opera", Some("u9")).await;
        assert_eq!(books.len(), 2);
        assert_eq!(catalog.graph_rag_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *catalog.last_review_ids.lock().unwrap(),
            vec!["r1".to_string(), "r2".to_string()]
        );
        assert_eq!(catalog.last_user_id.lock().unwrap().as_deref(), Some("u9"));
    }

    #[tokio::test]
    async fn missing_user_id_defaults_to_placeholder() {
        let (catalog, svc) = service(
            MockCatalog {
                books: vec![book("b1")],
                ..MockCatalog::default()
            },
            MockIndex {
                docs: vec![doc("r1")],
                ..MockIndex::default()
            },
        );

        let _ = svc.books_by_theme("theme", None).await;
        assert_eq!(
            catalog.last_user_id.lock().unwrap().as_deref(),
            Some(DEFAULT_USER_ID)
        );

        let _ = svc.count_books_read(Some("")).await;
        assert_eq!(
            catalog.last_user_id.lock().unwrap().as_deref(),
            Some(DEFAULT_USER_ID)
        );
    }

    #[tokio::test]
    async fn graph_expansion_failure_collapses_to_empty() {
        let (catalog, svc) = service(
            MockCatalog {
                fail: true,
                ..MockCatalog::default()
            },
            MockIndex {
                docs: vec![doc("r1")],
                ..MockIndex::default()
            },
        );

        let books = svc.books_by_theme("theme", Some("u1")).await;
        assert!(books.is_empty());
        assert_eq!(catalog.graph_rag_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeated_calls_return_identical_results() {
        let (_, svc) = service(
            MockCatalog {
                books: vec![book("b1"), book("b2")],
                ..MockCatalog::default()
            },
            MockIndex {
                docs: vec![doc("r1")],
                ..MockIndex::default()
            },
        );

        let first = svc.highly_rated_books().await.unwrap();
        let second = svc.highly_rated_books().await.unwrap();
        assert_eq!(first, second);

        let first = svc.books_by_theme("space opera", Some("u1")).await;
        let second = svc.books_by_theme("space opera", Some("u1")).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn count_passthrough() {
        let (_, svc) = service(
            MockCatalog {
                count: 3,
                ..MockCatalog::default()
            },
            MockIndex::default(),
        );

        assert_eq!(svc.count_books_read(Some("user-A")).await.unwrap(), 3);
    }
}
