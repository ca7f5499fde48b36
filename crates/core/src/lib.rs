//! Core types and traits for the document store
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: tagged union of property payloads, and its byte codec
//! - Key codec: (docid, property) <-> Store key
//! - Document, Filter, Query
//! - Status and DocStoreError: error taxonomy
//! - Limits: size limits enforced before writes
//! - Traits: the Store boundary (Ledger, Page, WriteSession, PageSnapshot)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod key;
pub mod limits;
pub mod traits;
pub mod types;
pub mod value;

pub use document::{Document, Filter, Query};
pub use error::{DocStoreError, Result, Status};
pub use key::{decode_key, encode_key, encode_prefix, marker_key};
pub use limits::Limits;
pub use traits::{
    Ledger, Page, PageSnapshot, Paged, StoreEntry, StoreError, StoreResult, WriteSession,
};
pub use types::PageId;
pub use value::Value;
