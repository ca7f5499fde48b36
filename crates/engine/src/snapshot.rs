//! DocumentSnapshot: point lookups and filtered scans over one Store snapshot
//!
//! A snapshot never changes after it is taken; isolation from later commits is
//! whatever the Store's snapshot provides.
//!
//! Queries scan the whole page in key order. Because every document's entries
//! are contiguous, the scan is assembled into documents as it streams in; a
//! document cut by a page boundary is carried over to the next page.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use docstore_core::key::{decode_docid, encode_prefix, validate_docid};
use docstore_core::{
    DocStoreError, Document, Filter, Limits, PageSnapshot, Query, Result, StoreEntry,
};

use crate::assembler::next_document;
use crate::status::store_error;

/// Every entry under `prefix`, following continuation tokens to exhaustion
pub(crate) async fn scan_entries(
    snapshot: &dyn PageSnapshot,
    prefix: &[u8],
) -> Result<Vec<StoreEntry>> {
    let mut entries = Vec::new();
    let mut token: Option<Vec<u8>> = None;
    loop {
        let page = snapshot
            .get_entries(Some(prefix), token.as_deref())
            .await
            .map_err(|e| store_error(e, "get_entries"))?;
        entries.extend(page.items);
        match page.next_token {
            Some(next) => token = Some(next),
            None => return Ok(entries),
        }
    }
}

/// Every key under `prefix`, following continuation tokens to exhaustion
pub(crate) async fn scan_keys(snapshot: &dyn PageSnapshot, prefix: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut keys = Vec::new();
    let mut token: Option<Vec<u8>> = None;
    loop {
        let page = snapshot
            .get_keys(Some(prefix), token.as_deref())
            .await
            .map_err(|e| store_error(e, "get_keys"))?;
        keys.extend(page.items);
        match page.next_token {
            Some(next) => token = Some(next),
            None => return Ok(keys),
        }
    }
}

/// Split off the run of entries belonging to the last document in `batch`
fn split_trailing_run(batch: &mut Vec<StoreEntry>) -> Result<Vec<StoreEntry>> {
    let Some(last) = batch.last() else {
        return Ok(Vec::new());
    };
    let prefix = encode_prefix(&decode_docid(&last.key)?);
    let start = batch
        .iter()
        .rposition(|entry| !entry.key.starts_with(&prefix))
        .map_or(0, |i| i + 1);
    Ok(batch.split_off(start))
}

/// Read-only view of the document store at one point in time
#[derive(Clone)]
pub struct DocumentSnapshot {
    snapshot: Arc<dyn PageSnapshot>,
    limits: Limits,
}

impl DocumentSnapshot {
    pub(crate) fn new(snapshot: Arc<dyn PageSnapshot>, limits: Limits) -> Self {
        DocumentSnapshot { snapshot, limits }
    }

    /// Get one live document
    ///
    /// # Errors
    ///
    /// - `DocumentNotFound` if the document has no entries or is tombstoned
    /// - `DataError` if its entries fail to decode
    /// - `InvalidArgument` if `docid` is not a valid docid
    pub async fn get_one(&self, docid: &str) -> Result<Document> {
        validate_docid(docid, &self.limits)?;
        let entries = scan_entries(&*self.snapshot, &encode_prefix(docid)).await?;
        let not_found = || DocStoreError::DocumentNotFound {
            docid: docid.to_string(),
        };
        if entries.is_empty() {
            return Err(not_found());
        }

        match next_document(&mut entries.into_iter().peekable())? {
            Some(record) if !record.is_deleted() => Ok(record.into_document()),
            _ => {
                debug!(target: "docstore::query", docid, "Tombstoned document requested");
                Err(not_found())
            }
        }
    }

    /// Multi-document get; not supported by this store
    pub async fn get<S: AsRef<str>>(&self, docids: &[S]) -> Result<Vec<Document>> {
        debug!(target: "docstore::query", count = docids.len(), "Rejected multi-document get");
        Err(DocStoreError::Unsupported { operation: "get" })
    }

    /// Every live document matching `query`, in ascending docid order
    ///
    /// All or nothing: a decode failure anywhere aborts the query with
    /// `DataError` and no results.
    pub async fn execute_query(&self, query: &Query) -> Result<Vec<Document>> {
        let filter = &query.filter;
        let mut matches = Vec::new();
        let mut scanned = 0usize;
        let mut pages = 0usize;
        let mut carry: Vec<StoreEntry> = Vec::new();
        let mut token: Option<Vec<u8>> = None;

        loop {
            let page = self
                .snapshot
                .get_entries(None, token.as_deref())
                .await
                .map_err(|e| store_error(e, "get_entries"))?;
            pages += 1;

            let mut batch = std::mem::take(&mut carry);
            batch.extend(page.items);
            if page.next_token.is_some() {
                carry = split_trailing_run(&mut batch)?;
            }

            let mut entries = batch.into_iter().peekable();
            while let Some(record) = next_document(&mut entries)? {
                scanned += 1;
                if !record.is_deleted() && filter.matches(&record.document) {
                    matches.push(record.into_document());
                }
            }

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        debug!(
            target: "docstore::query",
            pages,
            scanned,
            matched = matches.len(),
            "Query executed"
        );
        Ok(matches)
    }

    /// Shorthand for [`execute_query`](Self::execute_query) with a bare filter
    pub async fn query(&self, filter: Filter) -> Result<Vec<Document>> {
        self.execute_query(&Query::new(filter)).await
    }
}

impl fmt::Debug for DocumentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSnapshot")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
