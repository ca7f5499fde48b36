//! Testing utilities: fault injection at the Store boundary
//!
//! [`FaultyPage`] wraps any [`Page`] and fails selected writes, so callers can
//! check that a sub-request failure surfaces through their joins even when
//! sibling requests succeeded.
//!
//! # Example
//!
//! ```ignore
//! let page = FaultyPage::new(Arc::new(MemoryPage::new()))
//!     .fail_writes_matching(|key| key.ends_with(b"secret\0"), StoreError::IoError);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use docstore_core::{Page, PageId, PageSnapshot, StoreError, StoreResult, WriteSession};

type KeyPredicate = Arc<dyn Fn(&[u8]) -> bool + Send + Sync>;

#[derive(Clone)]
struct FaultPlan {
    write_predicate: Option<(KeyPredicate, StoreError)>,
    commit_error: Option<StoreError>,
}

/// A page whose sessions fail selected operations
#[derive(Clone)]
pub struct FaultyPage {
    inner: Arc<dyn Page>,
    plan: FaultPlan,
    /// Sessions still allowed to begin, and the error once exhausted
    begin_budget: Option<(Arc<AtomicUsize>, StoreError)>,
}

impl FaultyPage {
    /// Wrap `inner` with no faults configured
    pub fn new(inner: Arc<dyn Page>) -> Self {
        FaultyPage {
            inner,
            plan: FaultPlan {
                write_predicate: None,
                commit_error: None,
            },
            begin_budget: None,
        }
    }

    /// Fail every put/delete whose key matches `predicate` with `error`
    ///
    /// Failed writes are not forwarded to the wrapped session.
    pub fn fail_writes_matching(
        mut self,
        predicate: impl Fn(&[u8]) -> bool + Send + Sync + 'static,
        error: StoreError,
    ) -> Self {
        self.plan.write_predicate = Some((Arc::new(predicate), error));
        self
    }

    /// Let the first `allowed` sessions begin, then fail every later
    /// `begin_transaction` with `error`
    ///
    /// Clones share the budget.
    pub fn fail_begins_after(mut self, allowed: usize, error: StoreError) -> Self {
        self.begin_budget = Some((Arc::new(AtomicUsize::new(allowed)), error));
        self
    }

    /// Fail every commit with `error`; the wrapped session is left open
    pub fn fail_commits(mut self, error: StoreError) -> Self {
        self.plan.commit_error = Some(error);
        self
    }
}

#[async_trait]
impl Page for FaultyPage {
    fn id(&self) -> PageId {
        self.inner.id()
    }

    async fn begin_transaction(&self) -> StoreResult<Arc<dyn WriteSession>> {
        if let Some((remaining, error)) = &self.begin_budget {
            let granted = remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if !granted {
                return Err(*error);
            }
        }
        let inner = self.inner.begin_transaction().await?;
        Ok(Arc::new(FaultySession {
            inner,
            plan: self.plan.clone(),
        }))
    }

    async fn get_snapshot(&self) -> StoreResult<Arc<dyn PageSnapshot>> {
        self.inner.get_snapshot().await
    }
}

struct FaultySession {
    inner: Arc<dyn WriteSession>,
    plan: FaultPlan,
}

impl FaultySession {
    fn check(&self, key: &[u8]) -> StoreResult<()> {
        match &self.plan.write_predicate {
            Some((predicate, error)) if predicate(key) => Err(*error),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl WriteSession for FaultySession {
    async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> StoreResult<()> {
        self.check(&key)?;
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: Vec<u8>) -> StoreResult<()> {
        self.check(&key)?;
        self.inner.delete(key).await
    }

    async fn commit(&self) -> StoreResult<()> {
        match self.plan.commit_error {
            Some(error) => Err(error),
            None => self.inner.commit().await,
        }
    }

    async fn rollback(&self) -> StoreResult<()> {
        self.inner.rollback().await
    }

    async fn get_snapshot(&self) -> StoreResult<Arc<dyn PageSnapshot>> {
        self.inner.get_snapshot().await
    }
}
