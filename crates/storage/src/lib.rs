//! In-memory Ledger for the document store
//!
//! This crate implements the Store boundary defined in `docstore-core`:
//! - MemoryLedger: registry of pages
//! - MemoryPage: BTreeMap-based versioned page with RwLock
//! - MemorySession: buffered writes applied atomically at commit
//! - ClonedSnapshot: immutable point-in-time view
//! - Range pagination with continuation tokens
//! - FaultyPage: fault injection for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod page;
pub mod session;
pub mod snapshot;
pub mod testing;

pub use page::{MemoryLedger, MemoryPage, DEFAULT_PAGE_SIZE};
pub use session::{MemorySession, SessionView};
pub use snapshot::ClonedSnapshot;
pub use testing::FaultyPage;
