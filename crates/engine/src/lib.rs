//! Document store engine
//!
//! This crate layers documents over the Store boundary:
//! - Join: fan-in barrier merging sub-request statuses
//! - Assembler: sorted Store entries back into documents
//! - DocumentTransaction: batched, atomically committed document writes
//! - DocumentSnapshot: point lookups and filtered scans
//! - DocumentStore: binds one Ledger page, hands out the above
//! - Configuration (`docstore.toml`) and transaction metrics

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembler;
pub mod config;
pub mod join;
pub mod metrics;
pub mod snapshot;
pub mod status;
pub mod store;
pub mod transaction;

pub use assembler::{next_document, DocumentRecord};
pub use config::{DocStoreConfig, CONFIG_FILE_NAME};
pub use join::{Join, StatusJoin};
pub use metrics::TransactionMetrics;
pub use snapshot::DocumentSnapshot;
pub use store::DocumentStore;
pub use transaction::DocumentTransaction;
