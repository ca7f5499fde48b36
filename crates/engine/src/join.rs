//! Fan-in join: N unordered completions, one finalizer call
//!
//! A logical mutation is carried out as many independent Store requests. The
//! join counts them down and fires its finalizer exactly once, after the last
//! report, with the merged status of all reports.
//!
//! # Merge rule
//!
//! Last non-OK wins: every non-OK report overwrites the observed status, OK
//! reports leave it alone. The final status is `Ok` iff every report was `Ok`.
//!
//! # State word
//!
//! Status and remaining count share one `AtomicU64` so that decrement and
//! merge happen in a single compare-and-swap:
//!
//! ```text
//! bits 63..56  observed status code
//! bits 55..0   remaining reports
//! ```
//!
//! The state is reference counted. Every sub-request holds a clone, so a report
//! arriving after the originating transaction is gone still lands on valid state.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{trace, warn};

use docstore_core::Status;

const COUNT_BITS: u32 = 56;
const COUNT_MASK: u64 = (1 << COUNT_BITS) - 1;

type Finalizer = Box<dyn FnOnce(Status) + Send>;

struct JoinState {
    word: AtomicU64,
    finalizer: Mutex<Option<Finalizer>>,
}

impl JoinState {
    fn fire(&self, status: Status) {
        // Taken at most once: only the report that reaches zero gets here.
        // The guard is released before the callback runs.
        let finalizer = self.finalizer.lock().take();
        if let Some(finalizer) = finalizer {
            trace!(target: "docstore::join", %status, "Join complete");
            finalizer(status);
        }
    }
}

/// Join that merges reported statuses
#[derive(Clone)]
pub struct StatusJoin {
    state: Arc<JoinState>,
}

impl StatusJoin {
    /// Create a join expecting `expected` reports
    ///
    /// With `expected == 0` the finalizer runs immediately with `Status::Ok`.
    pub fn new(expected: usize, finalizer: impl FnOnce(Status) + Send + 'static) -> Self {
        let expected = (expected as u64).min(COUNT_MASK);
        let join = StatusJoin {
            state: Arc::new(JoinState {
                word: AtomicU64::new(expected),
                finalizer: Mutex::new(Some(Box::new(finalizer))),
            }),
        };
        if expected == 0 {
            join.state.fire(Status::Ok);
        }
        join
    }

    /// Create a join whose merged status is delivered on a channel
    pub fn channel(expected: usize) -> (Self, oneshot::Receiver<Status>) {
        let (tx, rx) = oneshot::channel();
        let join = StatusJoin::new(expected, move |status| {
            // Receiver dropped means nobody is waiting any more
            let _ = tx.send(status);
        });
        (join, rx)
    }

    /// Report one completion
    ///
    /// Reports beyond the expected count are ignored.
    pub fn report(&self, status: Status) {
        let mut current = self.state.word.load(Ordering::Acquire);
        loop {
            let remaining = current & COUNT_MASK;
            if remaining == 0 {
                warn!(target: "docstore::join", %status, "Report on completed join ignored");
                return;
            }

            let observed = (current >> COUNT_BITS) as u8;
            let merged = if status.is_ok() {
                observed
            } else {
                status.code()
            };
            let next = (u64::from(merged) << COUNT_BITS) | (remaining - 1);

            match self.state.word.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    if remaining == 1 {
                        self.state.fire(Status::from_code(merged));
                    }
                    return;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Reports still outstanding
    pub fn remaining(&self) -> usize {
        (self.state.word.load(Ordering::Acquire) & COUNT_MASK) as usize
    }

    /// Status merged so far
    pub fn observed(&self) -> Status {
        Status::from_code((self.state.word.load(Ordering::Acquire) >> COUNT_BITS) as u8)
    }
}

impl fmt::Debug for StatusJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusJoin")
            .field("remaining", &self.remaining())
            .field("observed", &self.observed())
            .finish()
    }
}

/// Join without a status: the finalizer only learns that all reports arrived
#[derive(Clone, Debug)]
pub struct Join {
    inner: StatusJoin,
}

impl Join {
    /// Create a join expecting `expected` reports
    pub fn new(expected: usize, finalizer: impl FnOnce() + Send + 'static) -> Self {
        Join {
            inner: StatusJoin::new(expected, move |_| finalizer()),
        }
    }

    /// Report one completion
    pub fn report(&self) {
        self.inner.report(Status::Ok);
    }

    /// Reports still outstanding
    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    fn counting_join(expected: usize) -> (StatusJoin, Arc<AtomicUsize>, Arc<Mutex<Option<Status>>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let result = Arc::new(Mutex::new(None));
        let join = {
            let calls = Arc::clone(&calls);
            let result = Arc::clone(&result);
            StatusJoin::new(expected, move |status| {
                calls.fetch_add(1, Ordering::SeqCst);
                *result.lock() = Some(status);
            })
        };
        (join, calls, result)
    }

    #[test]
    fn test_zero_expected_fires_immediately() {
        let (join, calls, result) = counting_join(0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*result.lock(), Some(Status::Ok));
        assert_eq!(join.remaining(), 0);
    }

    #[test]
    fn test_fires_once_after_last_report() {
        let (join, calls, result) = counting_join(3);
        join.report(Status::Ok);
        join.report(Status::Ok);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(join.remaining(), 1);

        join.report(Status::Ok);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*result.lock(), Some(Status::Ok));
    }

    #[test]
    fn test_last_non_ok_wins() {
        let (join, _, result) = counting_join(4);
        join.report(Status::UnknownError);
        join.report(Status::Ok);
        join.report(Status::PageNotFound);
        join.report(Status::Ok);
        assert_eq!(*result.lock(), Some(Status::PageNotFound));
    }

    #[test]
    fn test_extra_reports_ignored() {
        let (join, calls, result) = counting_join(1);
        join.report(Status::Ok);
        join.report(Status::DocumentDataError);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*result.lock(), Some(Status::Ok));
    }

    #[test]
    fn test_void_join() {
        let fired = Arc::new(AtomicUsize::new(0));
        let join = {
            let fired = Arc::clone(&fired);
            Join::new(2, move || {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        };
        join.report();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        join.report();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(join.remaining(), 0);
    }

    #[test]
    fn test_shuffled_reports_from_threads() {
        let choices = [Status::Ok, Status::UnknownError, Status::DocumentDataError];
        let mut rng = rand::thread_rng();

        for _ in 0..50 {
            let mut statuses: Vec<Status> = (0..32)
                .map(|_| *choices.choose(&mut rng).unwrap_or(&Status::Ok))
                .collect();
            statuses.shuffle(&mut rng);
            let all_ok = statuses.iter().all(|s| s.is_ok());

            let (join, calls, result) = counting_join(statuses.len());
            let handles: Vec<_> = statuses
                .into_iter()
                .map(|status| {
                    let join = join.clone();
                    thread::spawn(move || join.report(status))
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            assert_eq!(calls.load(Ordering::SeqCst), 1);
            let status = (*result.lock()).unwrap();
            assert_eq!(status.is_ok(), all_ok);
        }
    }

    #[test]
    fn test_state_outlives_creator() {
        let (join, calls, _) = counting_join(2);
        let a = join.clone();
        let b = join.clone();
        drop(join);

        thread::spawn(move || a.report(Status::Ok)).join().unwrap();
        thread::spawn(move || b.report(Status::Ok)).join().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_finalizer_runs_outside_lock() {
        let slot: Arc<Mutex<Option<StatusJoin>>> = Arc::new(Mutex::new(None));
        let unlocked = Arc::new(Mutex::new(None));
        let join = {
            let slot = Arc::clone(&slot);
            let unlocked = Arc::clone(&unlocked);
            StatusJoin::new(1, move |_| {
                if let Some(join) = slot.lock().as_ref() {
                    *unlocked.lock() = Some(join.state.finalizer.try_lock().is_some());
                }
            })
        };
        *slot.lock() = Some(join.clone());

        join.report(Status::Ok);
        assert_eq!(*unlocked.lock(), Some(true));
    }

    #[tokio::test]
    async fn test_channel_delivers_status() {
        let (join, rx) = StatusJoin::channel(2);
        let other = join.clone();
        tokio::spawn(async move { other.report(Status::InternalError) });
        join.report(Status::Ok);
        assert_eq!(rx.await.unwrap(), Status::InternalError);
    }

    #[tokio::test]
    async fn test_channel_zero_expected() {
        let (_join, rx) = StatusJoin::channel(0);
        assert_eq!(rx.await.unwrap(), Status::Ok);
    }
}
