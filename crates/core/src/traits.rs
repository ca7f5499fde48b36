//! Store boundary traits
//!
//! The document store is layered over a versioned, transactional key-value
//! Ledger. This module defines the only interface the engine depends on, as
//! `async_trait` trait objects so any Ledger binding can be plugged in:
//!
//! - [`Ledger`]: resolves a [`PageId`] to a [`Page`]
//! - [`Page`]: begins write sessions and hands out snapshots
//! - [`WriteSession`]: buffered puts/deletes made visible atomically at commit
//! - [`PageSnapshot`]: immutable, paginated range reads
//!
//! Failures are reported as [`StoreError`]. The engine maps them into its own
//! `Status`; they never cross the engine's public API.
//!
//! Thread safety: all handles are `Send + Sync` and may outlive the object
//! that created them.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::PageId;

/// Result type for Store calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures reported by the Store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The page does not exist
    #[error("page not found")]
    PageNotFound,
    /// The key does not exist
    #[error("key not found")]
    KeyNotFound,
    /// The session was already committed or rolled back
    #[error("no transaction in progress")]
    NoTransactionInProgress,
    /// A transaction is already open where only one is allowed
    #[error("transaction already in progress")]
    TransactionAlreadyInProgress,
    /// A continuation token does not belong to the requested range
    #[error("invalid continuation token")]
    InvalidToken,
    /// I/O failure inside the Store
    #[error("store I/O error")]
    IoError,
    /// Any other Store-internal failure
    #[error("store internal error")]
    Internal,
}

/// One key/value pair as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    /// Encoded key
    pub key: Vec<u8>,
    /// Encoded value
    pub value: Vec<u8>,
}

impl StoreEntry {
    /// Create an entry
    pub fn new(key: Vec<u8>, value: Vec<u8>) -> Self {
        StoreEntry { key, value }
    }
}

/// One page of a range read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paged<T> {
    /// Results in ascending key order
    pub items: Vec<T>,
    /// Token resuming the read after the last item, if more remain
    pub next_token: Option<Vec<u8>>,
}

/// Resolves pages by id
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Get the page with `id`; `PageNotFound` if it does not exist
    async fn get_page(&self, id: PageId) -> StoreResult<Arc<dyn Page>>;
}

/// One versioned key-value collection
#[async_trait]
pub trait Page: Send + Sync {
    /// Page identifier
    fn id(&self) -> PageId;

    /// Open a write session
    async fn begin_transaction(&self) -> StoreResult<Arc<dyn WriteSession>>;

    /// Take an immutable point-in-time view of committed state
    async fn get_snapshot(&self) -> StoreResult<Arc<dyn PageSnapshot>>;
}

/// A write session over one page
///
/// Writes are buffered and become visible to other readers only at `commit`.
#[async_trait]
pub trait WriteSession: Send + Sync {
    /// Buffer a put
    async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> StoreResult<()>;

    /// Buffer a delete; deleting an absent key is not an error
    async fn delete(&self, key: Vec<u8>) -> StoreResult<()>;

    /// Apply every buffered write atomically
    async fn commit(&self) -> StoreResult<()>;

    /// Discard every buffered write
    async fn rollback(&self) -> StoreResult<()>;

    /// Read view of the page as this session sees it: the committed state the
    /// session started from plus its own buffered writes, read at query time.
    async fn get_snapshot(&self) -> StoreResult<Arc<dyn PageSnapshot>>;
}

/// Paginated range reads
#[async_trait]
pub trait PageSnapshot: Send + Sync {
    /// Entries whose key starts with `key_prefix` (all entries when `None`),
    /// resuming from `token`
    async fn get_entries(
        &self,
        key_prefix: Option<&[u8]>,
        token: Option<&[u8]>,
    ) -> StoreResult<Paged<StoreEntry>>;

    /// Keys whose key starts with `key_prefix` (all keys when `None`),
    /// resuming from `token`
    async fn get_keys(
        &self,
        key_prefix: Option<&[u8]>,
        token: Option<&[u8]>,
    ) -> StoreResult<Paged<Vec<u8>>>;
}
