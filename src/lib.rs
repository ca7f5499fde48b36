//! Docstore - a document store layered over a versioned, transactional key-value page
//!
//! Documents are flattened into one Store entry per property, keyed so that a
//! prefix scan selects exactly one document. Transactions batch many document
//! writes into one atomic commit; snapshots serve point lookups and filtered
//! scans.
//!
//! # Quick Start
//!
//! ```ignore
//! use docstore::{DocStoreConfig, Document, DocumentStore, Filter};
//!
//! let store = DocumentStore::open_in_memory(&DocStoreConfig::default())?;
//!
//! let mut txn = store.begin_transaction().await?;
//! txn.put_one(&Document::new("d1").with("name", "alice")).await?;
//! txn.commit().await?;
//!
//! let snapshot = store.snapshot().await?;
//! let doc = snapshot.get_one("d1").await?;
//! let named = snapshot.query(Filter::has("name")).await?;
//! ```
//!
//! # Architecture
//!
//! - `docstore-core`: values, codecs, documents, errors and the Store traits
//! - `docstore-storage`: in-memory Ledger implementing the Store traits
//! - `docstore-engine`: joins, transactions, snapshots and the store facade

pub use docstore_core::{
    decode_key, encode_key, encode_prefix, marker_key, DocStoreError, Document, Filter, Ledger,
    Limits, Page, PageId, PageSnapshot, Paged, Query, Result, Status, StoreEntry, StoreError,
    StoreResult, Value, WriteSession,
};
pub use docstore_engine::{
    DocStoreConfig, DocumentRecord, DocumentSnapshot, DocumentStore, DocumentTransaction, Join,
    StatusJoin, TransactionMetrics, CONFIG_FILE_NAME,
};
pub use docstore_storage::{FaultyPage, MemoryLedger, MemoryPage};
