//! MemoryPage: in-memory versioned page with BTreeMap and version management
//!
//! This module implements the Store boundary using:
//! - `BTreeMap<Vec<u8>, Vec<u8>>` for ordered key storage
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` for monotonically increasing commit versions
//!
//! # Design Notes
//!
//! - **No version history**: Each key stores only its latest value
//! - **Commit is the only write path**: Sessions buffer writes and apply them
//!   under one write lock, so no reader observes a partial commit
//! - **Last committer wins**: Concurrent sessions are not validated against each
//!   other; isolation beyond atomic visibility is not provided

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use docstore_core::{
    Ledger, Page, PageId, PageSnapshot, StoreError, StoreResult, WriteSession,
};

use crate::session::{MemorySession, PendingWrite};
use crate::snapshot::{ClonedSnapshot, Entries};

/// Default maximum number of results per range read
pub const DEFAULT_PAGE_SIZE: usize = 256;

/// Shared page state; sessions and the page handle hold it by `Arc`
#[derive(Debug)]
pub(crate) struct PageInner {
    id: PageId,
    /// The main data store: ordered map from key to value
    data: RwLock<Entries>,
    /// Commit version counter
    version: AtomicU64,
    /// Maximum results per range read
    page_size: usize,
}

impl PageInner {
    pub(crate) fn page_size(&self) -> usize {
        self.page_size
    }

    /// Snapshot committed state as (version, data)
    pub(crate) fn snapshot_data(&self) -> (u64, Arc<Entries>) {
        // Read lock first, then version: a commit holding the write lock bumps the
        // version before releasing it, so data and version always agree.
        let data = self.data.read();
        let version = self.version.load(Ordering::SeqCst);
        (version, Arc::new(data.clone()))
    }

    /// Apply a session's writeset atomically
    ///
    /// Holds the write lock across all operations so no snapshot can see a
    /// partial commit. Returns the new commit version.
    pub(crate) fn apply_batch<'a>(
        &self,
        writes: impl Iterator<Item = (&'a Vec<u8>, &'a PendingWrite)>,
    ) -> u64 {
        let mut data = self.data.write();
        let mut puts = 0usize;
        let mut deletes = 0usize;
        for (key, write) in writes {
            match write {
                PendingWrite::Put(value) => {
                    data.insert(key.clone(), value.clone());
                    puts += 1;
                }
                PendingWrite::Delete => {
                    data.remove(key);
                    deletes += 1;
                }
            }
        }
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(target: "docstore::storage", page = %self.id, version, puts, deletes, "Batch applied");
        version
    }
}

/// In-memory page
///
/// Cheap to clone: clones share the same underlying data.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    inner: Arc<PageInner>,
}

impl MemoryPage {
    /// Create an empty page with a random id and the default page size
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create an empty page returning at most `page_size` results per read
    ///
    /// A page size of 0 is treated as 1.
    pub fn with_page_size(page_size: usize) -> Self {
        Self::with_id(PageId::new(), page_size)
    }

    fn with_id(id: PageId, page_size: usize) -> Self {
        MemoryPage {
            inner: Arc::new(PageInner {
                id,
                data: RwLock::new(Entries::new()),
                version: AtomicU64::new(0),
                page_size: page_size.max(1),
            }),
        }
    }

    /// Current commit version (0 before the first commit)
    pub fn current_version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    /// Number of committed entries
    pub fn len(&self) -> usize {
        self.inner.data.read().len()
    }

    /// Check if the page holds no committed entries
    pub fn is_empty(&self) -> bool {
        self.inner.data.read().is_empty()
    }

    /// Create a snapshot of committed state
    pub fn create_snapshot(&self) -> ClonedSnapshot {
        let (version, data) = self.inner.snapshot_data();
        ClonedSnapshot::new(version, data, self.inner.page_size)
    }

    /// Open a write session (concrete type)
    pub fn begin(&self) -> MemorySession {
        MemorySession::new(Arc::clone(&self.inner))
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Page for MemoryPage {
    fn id(&self) -> PageId {
        self.inner.id
    }

    async fn begin_transaction(&self) -> StoreResult<Arc<dyn WriteSession>> {
        Ok(Arc::new(self.begin()))
    }

    async fn get_snapshot(&self) -> StoreResult<Arc<dyn PageSnapshot>> {
        Ok(Arc::new(self.create_snapshot()))
    }
}

/// In-memory Ledger: a registry of pages
#[derive(Debug)]
pub struct MemoryLedger {
    pages: RwLock<HashMap<PageId, MemoryPage>>,
    page_size: usize,
}

impl MemoryLedger {
    /// Create an empty ledger whose pages use the default page size
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create an empty ledger whose pages return at most `page_size` results per read
    pub fn with_page_size(page_size: usize) -> Self {
        MemoryLedger {
            pages: RwLock::new(HashMap::new()),
            page_size,
        }
    }

    /// Create a new empty page and return its handle
    pub fn create_page(&self) -> MemoryPage {
        let page = MemoryPage::with_id(PageId::new(), self.page_size);
        self.pages.write().insert(page.inner.id, page.clone());
        debug!(target: "docstore::storage", page = %page.inner.id, "Page created");
        page
    }

    /// Remove a page; returns true if it existed
    ///
    /// Handles already obtained keep working on the detached data.
    pub fn delete_page(&self, id: PageId) -> bool {
        self.pages.write().remove(&id).is_some()
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.pages.read().len()
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn get_page(&self, id: PageId) -> StoreResult<Arc<dyn Page>> {
        match self.pages.read().get(&id) {
            Some(page) => Ok(Arc::new(page.clone())),
            None => Err(StoreError::PageNotFound),
        }
    }
}
