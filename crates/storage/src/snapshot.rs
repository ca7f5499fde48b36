//! ClonedSnapshot: point-in-time page view via deep clone
//!
//! This module provides immutable views of a page for readers, and the range
//! pagination shared by every read path of the in-memory Ledger.
//!
//! # Design Notes
//!
//! - **Deep clone**: The page's BTreeMap is copied when the snapshot is taken
//! - **Immutable**: Once created, the snapshot never changes
//! - **Thread-safe**: Data is Arc-wrapped and shared read-only
//!
//! # Pagination
//!
//! A read returns at most `page_size` results in ascending key order. When more
//! remain, the continuation token is the first key of the next page; passing it
//! back resumes the read there. A token outside the requested prefix is rejected.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;

use docstore_core::{PageSnapshot, Paged, StoreEntry, StoreError, StoreResult};

/// Ordered key/value data of a page
pub(crate) type Entries = BTreeMap<Vec<u8>, Vec<u8>>;

/// Read one page of the range selected by `prefix`, starting at `token`.
pub(crate) fn read_range<T>(
    data: &Entries,
    prefix: Option<&[u8]>,
    token: Option<&[u8]>,
    page_size: usize,
    map: impl Fn(&[u8], &[u8]) -> T,
) -> StoreResult<Paged<T>> {
    let prefix = prefix.unwrap_or(&[]);
    let start = match token {
        Some(token) if !token.starts_with(prefix) => return Err(StoreError::InvalidToken),
        Some(token) => token,
        None => prefix,
    };

    let mut range = data
        .range::<[u8], _>((Bound::Included(start), Bound::Unbounded))
        .take_while(|(key, _)| key.starts_with(prefix));

    let items: Vec<T> = range
        .by_ref()
        .take(page_size)
        .map(|(key, value)| map(key.as_slice(), value.as_slice()))
        .collect();
    let next_token = range.next().map(|(key, _)| key.clone());

    Ok(Paged { items, next_token })
}

pub(crate) fn entry(key: &[u8], value: &[u8]) -> StoreEntry {
    StoreEntry::new(key.to_vec(), value.to_vec())
}

/// A snapshot that clones the page's BTreeMap
///
/// Creates an immutable point-in-time view of committed state.
///
/// # Example
///
/// ```ignore
/// let page = MemoryPage::new();
/// // ... commit some writes ...
/// let snapshot = page.create_snapshot();
///
/// // Commits after snapshot creation are not visible
/// ```
#[derive(Debug, Clone)]
pub struct ClonedSnapshot {
    /// Commit version the snapshot was taken at
    version: u64,
    /// Deep clone of the page data at snapshot time
    data: Arc<Entries>,
    /// Maximum results per read
    page_size: usize,
}

impl ClonedSnapshot {
    pub(crate) fn new(version: u64, data: Arc<Entries>, page_size: usize) -> Self {
        Self {
            version,
            data,
            page_size,
        }
    }

    /// Get snapshot version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of entries visible in the snapshot
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the snapshot holds no entries
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl PageSnapshot for ClonedSnapshot {
    async fn get_entries(
        &self,
        key_prefix: Option<&[u8]>,
        token: Option<&[u8]>,
    ) -> StoreResult<Paged<StoreEntry>> {
        read_range(&self.data, key_prefix, token, self.page_size, entry)
    }

    async fn get_keys(
        &self,
        key_prefix: Option<&[u8]>,
        token: Option<&[u8]>,
    ) -> StoreResult<Paged<Vec<u8>>> {
        read_range(&self.data, key_prefix, token, self.page_size, |key, _| {
            key.to_vec()
        })
    }
}
