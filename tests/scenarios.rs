//! End-to-end scenarios through the public facade
//!
//! Every test opens a store the way an embedding application would: from a
//! config, over either a fresh in-memory page or an existing Ledger page.

use docstore::{
    DocStoreConfig, Document, DocumentStore, Filter, MemoryLedger, Page, Status, Value,
    CONFIG_FILE_NAME,
};

fn scenario_docs() -> Vec<Document> {
    vec![
        Document::new("d1").with("prop1", "value1"),
        Document::new("d2").with("prop1", "value2"),
        Document::new("d3").with("prop2", "value2"),
    ]
}

#[tokio::test]
async fn scenario_all_value_variants() {
    let store = DocumentStore::open_in_memory(&DocStoreConfig::default()).unwrap();

    let mut txn = store.begin_transaction().await.unwrap();
    txn.put_one(
        &Document::new("d1")
            .with("prop_string", "hello world!")
            .with("prop_int", 10i64)
            .with("prop_float", 10.5f64)
            .with("prop_binary", vec![0xDEu8, 0xAD])
            .with("prop_empty", Value::Empty(true)),
    )
    .await
    .unwrap();
    txn.commit().await.unwrap();

    let doc = store.snapshot().await.unwrap().get_one("d1").await.unwrap();
    assert_eq!(doc.get("prop_string"), Some(&Value::from("hello world!")));
    assert_eq!(doc.get("prop_int"), Some(&Value::Int(10)));
    assert_eq!(doc.get("prop_float"), Some(&Value::Float(10.5)));
    assert_eq!(doc.get("prop_binary"), Some(&Value::Binary(vec![0xDE, 0xAD])));
    assert!(doc.get("prop_empty").map(Value::is_empty).unwrap_or(false));
}

#[tokio::test]
async fn scenario_filters() {
    let store = DocumentStore::open_in_memory(&DocStoreConfig::default()).unwrap();
    let mut txn = store.begin_transaction().await.unwrap();
    txn.put(&scenario_docs()).await.unwrap();
    txn.commit().await.unwrap();

    let snapshot = store.snapshot().await.unwrap();
    assert_eq!(snapshot.query(Filter::MatchAll).await.unwrap().len(), 3);
    assert_eq!(snapshot.query(Filter::has("prop1")).await.unwrap().len(), 2);

    let exact = snapshot
        .query(Filter::equals("prop1", "value1"))
        .await
        .unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].docid(), "d1");
}

#[tokio::test]
async fn scenario_delete_and_resurrect() {
    let store = DocumentStore::open_in_memory(&DocStoreConfig::default()).unwrap();
    let mut txn = store.begin_transaction().await.unwrap();
    txn.put(&scenario_docs()).await.unwrap();
    txn.commit().await.unwrap();

    txn.delete_one("d2").await.unwrap();
    txn.commit().await.unwrap();

    let snapshot = store.snapshot().await.unwrap();
    let err = snapshot.get_one("d2").await.unwrap_err();
    assert_eq!(err.status(), Status::DocumentNotFound);
    let remaining = snapshot.query(Filter::MatchAll).await.unwrap();
    assert!(remaining.iter().all(|d| d.docid() != "d2"));

    txn.put_one(&Document::new("d2").with("prop1", "again"))
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let doc = store.snapshot().await.unwrap().get_one("d2").await.unwrap();
    assert_eq!(doc.get("prop1"), Some(&Value::from("again")));
}

#[tokio::test]
async fn scenario_open_ledger_page_from_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "page_size = 1\n").unwrap();
    let config = DocStoreConfig::from_file(&path).unwrap();

    let ledger = MemoryLedger::with_page_size(config.page_size);
    let page = ledger.create_page();

    let writer = DocumentStore::open(&ledger, page.id(), &config).await.unwrap();
    let mut txn = writer.begin_transaction().await.unwrap();
    txn.put(&scenario_docs()).await.unwrap();
    txn.commit().await.unwrap();

    let reader = DocumentStore::open(&ledger, page.id(), &config).await.unwrap();
    assert_eq!(reader.id(), writer.id());
    let all = reader.snapshot().await.unwrap().query(Filter::MatchAll).await.unwrap();
    assert_eq!(all, scenario_docs());
}
