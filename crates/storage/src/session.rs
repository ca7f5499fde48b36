//! MemorySession: buffered write session over a MemoryPage
//!
//! A session captures the page's committed state when it begins and buffers
//! every put/delete in an ordered writeset. `commit` applies the writeset to the
//! page atomically; `rollback` discards it. Either one closes the session, after
//! which every operation fails with `NoTransactionInProgress`.
//!
//! The session's own view ([`SessionView`]) reads the captured base overlaid
//! with the writeset at query time, so a session sees its own writes.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use docstore_core::{
    PageSnapshot, Paged, StoreEntry, StoreError, StoreResult, WriteSession,
};

use crate::page::PageInner;
use crate::snapshot::{entry, read_range, Entries};

/// A buffered write
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingWrite {
    Put(Vec<u8>),
    Delete,
}

#[derive(Debug)]
struct SessionState {
    /// Last write per key wins
    pending: BTreeMap<Vec<u8>, PendingWrite>,
    open: bool,
}

#[derive(Debug)]
struct SessionShared {
    page: Arc<PageInner>,
    /// Committed state at begin
    base: Arc<Entries>,
    base_version: u64,
    state: Mutex<SessionState>,
}

impl SessionShared {
    fn with_open_state<T>(&self, f: impl FnOnce(&mut SessionState) -> T) -> StoreResult<T> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(StoreError::NoTransactionInProgress);
        }
        Ok(f(&mut *state))
    }

    /// Base entries under `prefix` overlaid with pending writes under `prefix`
    fn merged_view(&self, prefix: Option<&[u8]>) -> Entries {
        let prefix = prefix.unwrap_or(&[]);
        let mut merged: Entries = self
            .base
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let state = self.state.lock();
        for (key, write) in state
            .pending
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
        {
            match write {
                PendingWrite::Put(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                PendingWrite::Delete => {
                    merged.remove(key);
                }
            }
        }
        merged
    }
}

/// Write session over a [`crate::MemoryPage`]
#[derive(Debug, Clone)]
pub struct MemorySession {
    shared: Arc<SessionShared>,
}

impl MemorySession {
    pub(crate) fn new(page: Arc<PageInner>) -> Self {
        let (base_version, base) = page.snapshot_data();
        MemorySession {
            shared: Arc::new(SessionShared {
                page,
                base,
                base_version,
                state: Mutex::new(SessionState {
                    pending: BTreeMap::new(),
                    open: true,
                }),
            }),
        }
    }

    /// Commit version the session started from
    pub fn base_version(&self) -> u64 {
        self.shared.base_version
    }

    /// Number of buffered writes
    pub fn pending_len(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// Check if the session can still accept writes
    pub fn is_open(&self) -> bool {
        self.shared.state.lock().open
    }
}

#[async_trait]
impl WriteSession for MemorySession {
    async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> StoreResult<()> {
        self.shared.with_open_state(|state| {
            state.pending.insert(key, PendingWrite::Put(value));
        })
    }

    async fn delete(&self, key: Vec<u8>) -> StoreResult<()> {
        self.shared.with_open_state(|state| {
            state.pending.insert(key, PendingWrite::Delete);
        })
    }

    async fn commit(&self) -> StoreResult<()> {
        let mut state = self.shared.state.lock();
        if !state.open {
            return Err(StoreError::NoTransactionInProgress);
        }
        state.open = false;
        // Pending writes are kept so the session view keeps showing what it committed
        self.shared.page.apply_batch(state.pending.iter());
        Ok(())
    }

    async fn rollback(&self) -> StoreResult<()> {
        let mut state = self.shared.state.lock();
        if !state.open {
            return Err(StoreError::NoTransactionInProgress);
        }
        state.open = false;
        let discarded = state.pending.len();
        state.pending.clear();
        debug!(target: "docstore::storage", discarded, "Session rolled back");
        Ok(())
    }

    async fn get_snapshot(&self) -> StoreResult<Arc<dyn PageSnapshot>> {
        Ok(Arc::new(SessionView {
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// Read view of a session: captured base plus the session's buffered writes
#[derive(Debug, Clone)]
pub struct SessionView {
    shared: Arc<SessionShared>,
}

#[async_trait]
impl PageSnapshot for SessionView {
    async fn get_entries(
        &self,
        key_prefix: Option<&[u8]>,
        token: Option<&[u8]>,
    ) -> StoreResult<Paged<StoreEntry>> {
        let merged = self.shared.merged_view(key_prefix);
        read_range(
            &merged,
            key_prefix,
            token,
            self.shared.page.page_size(),
            entry,
        )
    }

    async fn get_keys(
        &self,
        key_prefix: Option<&[u8]>,
        token: Option<&[u8]>,
    ) -> StoreResult<Paged<Vec<u8>>> {
        let merged = self.shared.merged_view(key_prefix);
        read_range(
            &merged,
            key_prefix,
            token,
            self.shared.page.page_size(),
            |key, _| key.to_vec(),
        )
    }
}
