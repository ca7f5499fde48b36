//! DocumentStore: entry point binding one Ledger page
//!
//! Hands out transactions and snapshots over the page and keeps the
//! transaction counters they report into.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use docstore_core::{Ledger, Limits, Page, PageId, Result};
use docstore_storage::MemoryPage;

use crate::config::DocStoreConfig;
use crate::metrics::{TransactionCounters, TransactionMetrics};
use crate::snapshot::DocumentSnapshot;
use crate::status::store_error;
use crate::transaction::DocumentTransaction;

/// A document store over one Ledger page
///
/// Cheap to clone: clones share the page and the counters.
#[derive(Clone)]
pub struct DocumentStore {
    page: Arc<dyn Page>,
    limits: Limits,
    counters: Arc<TransactionCounters>,
}

impl DocumentStore {
    /// Bind a page directly
    pub fn new(page: Arc<dyn Page>, limits: Limits) -> Self {
        DocumentStore {
            page,
            limits,
            counters: Arc::new(TransactionCounters::new()),
        }
    }

    /// Open a store over a fresh in-memory page
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `config` does not validate.
    pub fn open_in_memory(config: &DocStoreConfig) -> Result<Self> {
        config.validate()?;
        let page = MemoryPage::with_page_size(config.page_size);
        info!(target: "docstore::txn", page = %page.id(), "Opened in-memory document store");
        Ok(Self::new(Arc::new(page), config.limits()))
    }

    /// Open a store over an existing Ledger page
    ///
    /// The page keeps its own pagination; only the size limits of `config`
    /// apply. `config.page_size` is still validated.
    ///
    /// # Errors
    ///
    /// `PageNotFound` if the Ledger has no page `page_id`; `InvalidArgument` if
    /// `config` does not validate.
    pub async fn open(ledger: &dyn Ledger, page_id: PageId, config: &DocStoreConfig) -> Result<Self> {
        config.validate()?;
        let page = ledger
            .get_page(page_id)
            .await
            .map_err(|e| store_error(e, &format!("open page {}", page_id)))?;
        info!(
            target: "docstore::txn",
            page = %page_id,
            "Opened document store (config page_size not applied to an existing page)"
        );
        Ok(Self::new(page, config.limits()))
    }

    /// Id of the bound page
    pub fn id(&self) -> PageId {
        self.page.id()
    }

    /// Size limits enforced on writes
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Begin a transaction
    pub async fn begin_transaction(&self) -> Result<DocumentTransaction> {
        DocumentTransaction::begin(
            Arc::clone(&self.page),
            self.limits.clone(),
            Arc::clone(&self.counters),
        )
        .await
    }

    /// Take a snapshot of committed state
    pub async fn snapshot(&self) -> Result<DocumentSnapshot> {
        let snapshot = self
            .page
            .get_snapshot()
            .await
            .map_err(|e| store_error(e, "get_snapshot"))?;
        Ok(DocumentSnapshot::new(snapshot, self.limits.clone()))
    }

    /// Transaction statistics
    pub fn metrics(&self) -> TransactionMetrics {
        self.counters.snapshot()
    }
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("page", &self.page.id())
            .field("limits", &self.limits)
            .finish()
    }
}
