//! Error types for the document store
//!
//! Two layers:
//! - [`Status`]: the flat status code exchanged with callers and merged by joins
//! - [`DocStoreError`]: the error carried by `Result`, with per-variant context
//!
//! Every error maps to exactly one status via [`DocStoreError::status`].
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for document store operations
pub type Result<T> = std::result::Result<T, DocStoreError>;

/// Status codes reported to callers
///
/// The numeric codes are stable; they are what a transport binding puts on the wire
/// and what the join aggregator packs next to its remaining count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Status {
    /// Success
    Ok = 0,
    /// The referenced Store page does not exist
    PageNotFound = 1,
    /// No live document for the requested id (tombstoned documents included)
    DocumentNotFound = 2,
    /// Key or value bytes failed to decode
    DocumentDataError = 3,
    /// Reserved for create-only semantics
    DocumentAlreadyExists = 4,
    /// Reserved
    TransactionAlreadyInProgress = 5,
    /// An operation outside this store's scope was invoked
    Unsupported = 6,
    /// Fallback for an unrecognized Store status
    UnknownError = 7,
    /// A caller precondition was violated (bad docid, property name or size)
    InvalidArgument = 8,
    /// Local bookkeeping disagreed with the Store
    InternalError = 9,
}

impl Status {
    /// Numeric code of this status
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Status for a numeric code; unknown codes map to `UnknownError`
    pub fn from_code(code: u8) -> Status {
        match code {
            0 => Status::Ok,
            1 => Status::PageNotFound,
            2 => Status::DocumentNotFound,
            3 => Status::DocumentDataError,
            4 => Status::DocumentAlreadyExists,
            5 => Status::TransactionAlreadyInProgress,
            6 => Status::Unsupported,
            8 => Status::InvalidArgument,
            9 => Status::InternalError,
            _ => Status::UnknownError,
        }
    }

    /// Check if this is `Ok`
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    /// Convert into a `Result`, attaching `context` to the error
    pub fn into_result(self, context: &str) -> Result<()> {
        match DocStoreError::from_status(self, context) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Ok => "OK",
            Status::PageNotFound => "PAGE_NOT_FOUND",
            Status::DocumentNotFound => "DOCUMENT_NOT_FOUND",
            Status::DocumentDataError => "DOCUMENT_DATA_ERROR",
            Status::DocumentAlreadyExists => "DOCUMENT_ALREADY_EXISTS",
            Status::TransactionAlreadyInProgress => "TRANSACTION_ALREADY_IN_PROGRESS",
            Status::Unsupported => "UNSUPPORTED",
            Status::UnknownError => "UNKNOWN_ERROR",
            Status::InvalidArgument => "INVALID_ARGUMENT",
            Status::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(name)
    }
}

/// Error types for the document store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocStoreError {
    /// The Store page does not exist
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// No live document with this id
    #[error("Document not found: {docid}")]
    DocumentNotFound {
        /// Requested document id (empty when unknown, e.g. from a merged status)
        docid: String,
    },

    /// Stored key or value bytes failed to decode
    #[error("Document data error: {0}")]
    DataError(String),

    /// Reserved for create-only semantics
    #[error("Document already exists: {docid}")]
    DocumentAlreadyExists {
        /// Conflicting document id
        docid: String,
    },

    /// Reserved
    #[error("Transaction already in progress")]
    TransactionAlreadyInProgress,

    /// Operation is not supported by this store
    #[error("Unsupported operation: {operation}")]
    Unsupported {
        /// Name of the rejected operation
        operation: &'static str,
    },

    /// Caller supplied an invalid docid, property name or oversized value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The Store failed in a way with no dedicated status
    #[error("Unknown store error: {0}")]
    Unknown(String),

    /// Local bookkeeping disagreed with the Store
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocStoreError {
    /// Shorthand for a `DataError`
    pub fn data(msg: impl Into<String>) -> Self {
        DocStoreError::DataError(msg.into())
    }

    /// Shorthand for an `InvalidArgument`
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        DocStoreError::InvalidArgument(msg.into())
    }

    /// Shorthand for an `Internal` error
    pub fn internal(msg: impl Into<String>) -> Self {
        DocStoreError::Internal(msg.into())
    }

    /// Status code for this error
    pub fn status(&self) -> Status {
        match self {
            DocStoreError::PageNotFound(_) => Status::PageNotFound,
            DocStoreError::DocumentNotFound { .. } => Status::DocumentNotFound,
            DocStoreError::DataError(_) => Status::DocumentDataError,
            DocStoreError::DocumentAlreadyExists { .. } => Status::DocumentAlreadyExists,
            DocStoreError::TransactionAlreadyInProgress => Status::TransactionAlreadyInProgress,
            DocStoreError::Unsupported { .. } => Status::Unsupported,
            DocStoreError::InvalidArgument(_) => Status::InvalidArgument,
            DocStoreError::Unknown(_) => Status::UnknownError,
            DocStoreError::Internal(_) => Status::InternalError,
        }
    }

    /// Build the error for a non-`Ok` status; `None` for `Ok`
    ///
    /// Merged statuses lose the originating request's detail, so `context`
    /// names the logical operation instead.
    pub fn from_status(status: Status, context: &str) -> Option<Self> {
        let err = match status {
            Status::Ok => return None,
            Status::PageNotFound => DocStoreError::PageNotFound(context.to_string()),
            Status::DocumentNotFound => DocStoreError::DocumentNotFound {
                docid: String::new(),
            },
            Status::DocumentDataError => DocStoreError::DataError(context.to_string()),
            Status::DocumentAlreadyExists => DocStoreError::DocumentAlreadyExists {
                docid: String::new(),
            },
            Status::TransactionAlreadyInProgress => DocStoreError::TransactionAlreadyInProgress,
            Status::Unsupported => DocStoreError::Unsupported { operation: "unknown" },
            Status::InvalidArgument => DocStoreError::InvalidArgument(context.to_string()),
            Status::UnknownError => DocStoreError::Unknown(context.to_string()),
            Status::InternalError => DocStoreError::Internal(context.to_string()),
        };
        Some(err)
    }
}
