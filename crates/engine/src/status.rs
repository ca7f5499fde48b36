//! Store failures to document store statuses
//!
//! Nothing from the Store's error space crosses the engine's public API. Every
//! `StoreError` lands on one `Status`; the ones without a dedicated status fall
//! back to `UnknownError`.

use docstore_core::{DocStoreError, Status, StoreError};

/// Status for a Store failure
pub fn map_store_error(err: StoreError) -> Status {
    match err {
        StoreError::PageNotFound => Status::PageNotFound,
        StoreError::KeyNotFound => Status::DocumentNotFound,
        StoreError::TransactionAlreadyInProgress => Status::TransactionAlreadyInProgress,
        StoreError::NoTransactionInProgress
        | StoreError::InvalidToken
        | StoreError::IoError
        | StoreError::Internal => Status::UnknownError,
    }
}

/// Status for the outcome of one Store request
pub fn status_of<T>(result: &Result<T, StoreError>) -> Status {
    match result {
        Ok(_) => Status::Ok,
        Err(err) => map_store_error(*err),
    }
}

/// Error for a Store failure, with `context` naming the operation
pub fn store_error(err: StoreError, context: &str) -> DocStoreError {
    let detail = format!("{}: {}", context, err);
    match map_store_error(err) {
        Status::PageNotFound => DocStoreError::PageNotFound(detail),
        Status::DocumentNotFound => DocStoreError::DocumentNotFound {
            docid: String::new(),
        },
        Status::TransactionAlreadyInProgress => DocStoreError::TransactionAlreadyInProgress,
        _ => DocStoreError::Unknown(detail),
    }
}

/// Error for a failed commit
///
/// The transaction only commits sessions it believes are open, so a Store
/// reporting no transaction in progress means the two disagree.
pub fn commit_error(err: StoreError) -> DocStoreError {
    match err {
        StoreError::NoTransactionInProgress => {
            DocStoreError::internal("store reports no transaction in progress at commit")
        }
        other => store_error(other, "commit"),
    }
}
