//! DocumentTransaction: batched document writes over one Store write session
//!
//! ## Lifecycle
//!
//! ```text
//! begin ──► Active ──(put/delete …)──► commit ──► Committing ──► Active (fresh session)
//!              │                                       │
//!              └── drop: best-effort rollback          └── re-bind failed ──► Closed
//! ```
//!
//! ## Fan-out
//!
//! Writing one document is one Store request per property plus one for the
//! liveness marker, all dispatched concurrently and counted down by a
//! [`StatusJoin`]. Multi-document operations layer an outer join over the
//! per-document inner joins. Sibling requests always target distinct keys.
//!
//! Failures surface through the joins, but sibling requests that already
//! succeeded stay applied to the session: only `commit` is atomic.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use docstore_core::key::{encode_prefix, validate_docid, validate_property};
use docstore_core::{
    encode_key, marker_key, DocStoreError, Document, Limits, Page, PageSnapshot, Result, Status,
    Value, WriteSession,
};

use crate::join::StatusJoin;
use crate::metrics::TransactionCounters;
use crate::snapshot::scan_keys;
use crate::status::{commit_error, status_of, store_error};

/// One Store request of a logical mutation
#[derive(Debug, Clone, PartialEq, Eq)]
enum Write {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl Write {
    async fn apply(self, session: Arc<dyn WriteSession>) -> Status {
        let result = match self {
            Write::Put { key, value } => session.put(key, value).await,
            Write::Delete { key } => session.delete(key).await,
        };
        status_of(&result)
    }
}

/// Run every task concurrently and merge their statuses
async fn fan_out<F>(tasks: Vec<F>) -> Status
where
    F: Future<Output = Status> + Send + 'static,
{
    let (join, done) = StatusJoin::channel(tasks.len());
    for task in tasks {
        let join = join.clone();
        tokio::spawn(async move { join.report(task.await) });
    }
    drop(join);

    match done.await {
        Ok(status) => status,
        Err(_) => {
            // Every holder of the join is gone without the last report
            warn!(target: "docstore::join", "Sub-request task ended without reporting");
            Status::InternalError
        }
    }
}

/// Issue `writes` on `session` and wait for all of them
async fn dispatch(session: Arc<dyn WriteSession>, writes: Vec<Write>) -> Status {
    let tasks = writes
        .into_iter()
        .map(|write| write.apply(Arc::clone(&session)))
        .collect();
    fan_out(tasks).await
}

/// Store requests that write `doc`: marker first, then one per property
fn document_writes(doc: &Document, limits: &Limits) -> Result<Vec<Write>> {
    let docid = doc.docid();
    validate_docid(docid, limits)?;

    let mut writes = Vec::with_capacity(doc.len() + doc.cleared().len() + 1);
    writes.push(Write::Put {
        key: marker_key(docid),
        value: Value::Iri(docid.to_string()).to_bytes(),
    });
    for (property, value) in doc.properties() {
        validate_property(property, limits)?;
        let value = value.to_bytes();
        limits.validate_value_len(property, value.len())?;
        writes.push(Write::Put {
            key: encode_key(docid, property),
            value,
        });
    }
    for property in doc.cleared() {
        validate_property(property, limits)?;
        if doc.contains(property) {
            return Err(DocStoreError::invalid_argument(format!(
                "property '{}' is both set and cleared",
                property
            )));
        }
        writes.push(Write::Delete {
            key: encode_key(docid, property),
        });
    }
    Ok(writes)
}

/// Store requests that tombstone `docid` as `view` sees it
///
/// Every key but the marker is deleted; the marker is overwritten with the
/// tombstone. Empty when the document has no keys at all.
async fn tombstone_writes(view: &dyn PageSnapshot, docid: &str) -> Result<Vec<Write>> {
    let keys = scan_keys(view, &encode_prefix(docid)).await?;
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let marker = marker_key(docid);
    let mut writes: Vec<Write> = keys
        .into_iter()
        .filter(|key| *key != marker)
        .map(|key| Write::Delete { key })
        .collect();
    writes.push(Write::Put {
        key: marker,
        value: Value::TOMBSTONE.to_bytes(),
    });
    Ok(writes)
}

/// A write session and the view through it
struct Bound {
    session: Arc<dyn WriteSession>,
    view: Arc<dyn PageSnapshot>,
}

async fn bind(page: &dyn Page) -> Result<Bound> {
    let session = page
        .begin_transaction()
        .await
        .map_err(|e| store_error(e, "begin_transaction"))?;
    let view = session
        .get_snapshot()
        .await
        .map_err(|e| store_error(e, "get_snapshot"))?;
    Ok(Bound { session, view })
}

enum TxnState {
    Active(Bound),
    /// Only observable if a commit future was dropped before completing
    Committing,
    Closed,
}

impl TxnState {
    fn name(&self) -> &'static str {
        match self {
            TxnState::Active(_) => "active",
            TxnState::Committing => "committing",
            TxnState::Closed => "closed",
        }
    }
}

/// Batches document mutations into one atomic commit
///
/// Reusable: a successful or failed `commit` re-binds the transaction to a fresh
/// Store session. Dropping an active transaction rolls its session back.
pub struct DocumentTransaction {
    page: Arc<dyn Page>,
    state: TxnState,
    limits: Limits,
    counters: Arc<TransactionCounters>,
}

impl DocumentTransaction {
    pub(crate) async fn begin(
        page: Arc<dyn Page>,
        limits: Limits,
        counters: Arc<TransactionCounters>,
    ) -> Result<Self> {
        let bound = bind(&*page).await?;
        counters.record_start();
        debug!(target: "docstore::txn", page = %page.id(), "Transaction started");
        Ok(DocumentTransaction {
            page,
            state: TxnState::Active(bound),
            limits,
            counters,
        })
    }

    fn bound(&self) -> Result<&Bound> {
        match &self.state {
            TxnState::Active(bound) => Ok(bound),
            other => Err(DocStoreError::internal(format!(
                "transaction is {}",
                other.name()
            ))),
        }
    }

    /// Check if the transaction accepts operations
    pub fn is_active(&self) -> bool {
        matches!(self.state, TxnState::Active(_))
    }

    /// Write one document
    ///
    /// Each property with a value is put, each cleared property is deleted, and
    /// the document is marked live.
    pub async fn put_one(&self, doc: &Document) -> Result<()> {
        let writes = document_writes(doc, &self.limits)?;
        let session = Arc::clone(&self.bound()?.session);
        debug!(target: "docstore::txn", docid = doc.docid(), requests = writes.len(), "PutOne");

        dispatch(session, writes)
            .await
            .into_result(&format!("put_one '{}'", doc.docid()))
    }

    /// Write many documents
    ///
    /// Every document is validated before anything is dispatched.
    pub async fn put(&self, docs: &[Document]) -> Result<()> {
        let plans = docs
            .iter()
            .map(|doc| document_writes(doc, &self.limits))
            .collect::<Result<Vec<_>>>()?;
        let session = &self.bound()?.session;
        debug!(target: "docstore::txn", documents = plans.len(), "Put");

        let tasks = plans
            .into_iter()
            .map(|writes| dispatch(Arc::clone(session), writes))
            .collect();
        fan_out(tasks).await.into_result("put")
    }

    /// Tombstone one document
    ///
    /// Deleting a document with no entries is a no-op. A tombstoned document can
    /// be written again.
    pub async fn delete_one(&self, docid: &str) -> Result<()> {
        validate_docid(docid, &self.limits)?;
        let bound = self.bound()?;
        let writes = tombstone_writes(&*bound.view, docid).await?;
        if writes.is_empty() {
            debug!(target: "docstore::txn", docid, "DeleteOne of absent document");
            return Ok(());
        }
        debug!(target: "docstore::txn", docid, requests = writes.len(), "DeleteOne");

        dispatch(Arc::clone(&bound.session), writes)
            .await
            .into_result(&format!("delete_one '{}'", docid))
    }

    /// Tombstone many documents
    ///
    /// Every docid is validated before anything is dispatched.
    pub async fn delete<S: AsRef<str>>(&self, docids: &[S]) -> Result<()> {
        for docid in docids {
            validate_docid(docid.as_ref(), &self.limits)?;
        }
        let bound = self.bound()?;
        debug!(target: "docstore::txn", documents = docids.len(), "Delete");

        let tasks = docids
            .iter()
            .map(|docid| {
                let docid = docid.as_ref().to_string();
                let session = Arc::clone(&bound.session);
                let view = Arc::clone(&bound.view);
                async move {
                    match tombstone_writes(&*view, &docid).await {
                        Ok(writes) => dispatch(session, writes).await,
                        Err(err) => err.status(),
                    }
                }
            })
            .collect();
        fan_out(tasks).await.into_result("delete")
    }

    /// Bulk create-or-replace; not supported by this store
    pub async fn create_or_replace(&self, docs: &[Document]) -> Result<()> {
        debug!(target: "docstore::txn", documents = docs.len(), "Rejected create_or_replace");
        Err(DocStoreError::Unsupported {
            operation: "create_or_replace",
        })
    }

    /// Commit every write so far atomically
    ///
    /// Whatever the outcome, the transaction is re-bound to a fresh session and
    /// can be used again. The result is always the Store's commit outcome: if
    /// re-binding fails the transaction is closed and every later operation
    /// fails with `Internal`.
    pub async fn commit(&mut self) -> Result<()> {
        let bound = match std::mem::replace(&mut self.state, TxnState::Committing) {
            TxnState::Active(bound) => bound,
            other => {
                let name = other.name();
                self.state = other;
                return Err(DocStoreError::internal(format!("transaction is {}", name)));
            }
        };

        let outcome = bound.session.commit().await;
        match &outcome {
            Ok(()) => {
                self.counters.record_commit();
                info!(target: "docstore::txn", page = %self.page.id(), "Transaction committed");
            }
            Err(err) => {
                self.counters.record_rollback();
                warn!(target: "docstore::txn", error = %err, "Commit failed");
                // Release the failed session; its outcome changes nothing
                let _ = bound.session.rollback().await;
            }
        }
        drop(bound);

        match bind(&*self.page).await {
            Ok(next) => {
                self.counters.record_start();
                self.state = TxnState::Active(next);
            }
            Err(err) => {
                warn!(target: "docstore::txn", error = %err, "Re-binding after commit failed");
                self.state = TxnState::Closed;
            }
        }

        outcome.map_err(commit_error)
    }

    /// Discard every write so far and close the transaction
    pub async fn rollback(mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, TxnState::Closed) {
            TxnState::Active(bound) => {
                self.counters.record_rollback();
                debug!(target: "docstore::txn", "Transaction rolled back");
                bound
                    .session
                    .rollback()
                    .await
                    .map_err(|e| store_error(e, "rollback"))
            }
            other => Err(DocStoreError::internal(format!(
                "transaction is {}",
                other.name()
            ))),
        }
    }
}

impl Drop for DocumentTransaction {
    fn drop(&mut self) {
        let TxnState::Active(bound) = std::mem::replace(&mut self.state, TxnState::Closed) else {
            return;
        };
        self.counters.record_rollback();

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let result = bound.session.rollback().await;
                    debug!(
                        target: "docstore::txn",
                        ok = result.is_ok(),
                        "Dropped transaction rolled back"
                    );
                });
            }
            Err(_) => {
                debug!(target: "docstore::txn", "No runtime; dropped transaction not rolled back");
            }
        }
    }
}

impl fmt::Debug for DocumentTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentTransaction")
            .field("page", &self.page.id())
            .field("state", &self.state.name())
            .finish()
    }
}
