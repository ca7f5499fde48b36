//! Shared helpers for engine integration tests

#![allow(dead_code)]

use std::sync::Arc;

use docstore_core::{Document, Limits, Page, Value};
use docstore_engine::DocumentStore;
use docstore_storage::MemoryPage;

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A store over a fresh in-memory page, plus the page for raw inspection
pub fn memory_store(page_size: usize) -> (DocumentStore, MemoryPage) {
    init_tracing();
    let page = MemoryPage::with_page_size(page_size);
    let store = DocumentStore::new(Arc::new(page.clone()), Limits::default());
    (store, page)
}

/// A store over an arbitrary page
pub fn store_over(page: impl Page + 'static) -> DocumentStore {
    init_tracing();
    DocumentStore::new(Arc::new(page), Limits::default())
}

/// Commit `docs` in one transaction
pub async fn seed(store: &DocumentStore, docs: &[Document]) {
    let mut txn = store.begin_transaction().await.unwrap();
    txn.put(docs).await.unwrap();
    txn.commit().await.unwrap();
}

/// The three documents used by the filter scenarios
pub fn filter_docs() -> Vec<Document> {
    vec![
        Document::new("d1").with("prop1", "value1"),
        Document::new("d2").with("prop1", "value2"),
        Document::new("d3").with("prop2", "value2"),
    ]
}

/// Docids of `docs`, in order
pub fn docids(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.docid()).collect()
}

/// A document exercising every value variant
pub fn all_types_doc(docid: &str) -> Document {
    Document::new(docid)
        .with("prop_string", "hello world!")
        .with("prop_int", 10i64)
        .with("prop_float", 10.5f64)
        .with("prop_binary", vec![0xDEu8, 0xAD])
        .with("prop_empty", Value::Empty(true))
}
