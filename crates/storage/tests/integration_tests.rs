//! Integration tests for the in-memory Ledger
//!
//! These tests drive the storage layer only through the Store boundary traits:
//! - Atomic visibility of commits
//! - Snapshot isolation from later commits
//! - Pagination across many pages
//! - Concurrent sessions on one page

use std::collections::HashSet;
use std::sync::Arc;

use docstore_core::{Ledger, Page, PageSnapshot, StoreError};
use docstore_storage::{MemoryLedger, MemoryPage};

// ============================================================================
// Helper Functions
// ============================================================================

async fn all_keys(snapshot: &Arc<dyn PageSnapshot>, prefix: Option<&[u8]>) -> Vec<Vec<u8>> {
    let mut keys = Vec::new();
    let mut token: Option<Vec<u8>> = None;
    loop {
        let page = snapshot.get_keys(prefix, token.as_deref()).await.unwrap();
        keys.extend(page.items);
        match page.next_token {
            Some(next) => token = Some(next),
            None => return keys,
        }
    }
}

async fn seed(page: &dyn Page, count: usize) {
    let session = page.begin_transaction().await.unwrap();
    for i in 0..count {
        let key = format!("key{:04}", i).into_bytes();
        session.put(key, vec![i as u8]).await.unwrap();
    }
    session.commit().await.unwrap();
}

// ============================================================================
// Visibility
// ============================================================================

mod visibility {
    use super::*;

    #[tokio::test]
    async fn test_uncommitted_writes_invisible_to_page_snapshots() {
        let page = MemoryPage::new();
        let session = page.begin_transaction().await.unwrap();
        session.put(b"k".to_vec(), b"v".to_vec()).await.unwrap();

        let snapshot = page.get_snapshot().await.unwrap();
        assert!(all_keys(&snapshot, None).await.is_empty());

        session.commit().await.unwrap();
        let snapshot = page.get_snapshot().await.unwrap();
        assert_eq!(all_keys(&snapshot, None).await, vec![b"k".to_vec()]);
    }

    #[tokio::test]
    async fn test_snapshot_isolated_from_later_commits() {
        let page = MemoryPage::new();
        seed(&page, 3).await;
        let snapshot = page.get_snapshot().await.unwrap();

        let session = page.begin_transaction().await.unwrap();
        session.delete(b"key0000".to_vec()).await.unwrap();
        session.put(b"key9999".to_vec(), b"x".to_vec()).await.unwrap();
        session.commit().await.unwrap();

        assert_eq!(all_keys(&snapshot, None).await.len(), 3);
        let fresh = page.get_snapshot().await.unwrap();
        let keys = all_keys(&fresh, None).await;
        assert_eq!(keys.len(), 3);
        assert!(!keys.contains(&b"key0000".to_vec()));
        assert!(keys.contains(&b"key9999".to_vec()));
    }

    #[tokio::test]
    async fn test_rolled_back_session_leaves_no_trace() {
        let page = MemoryPage::new();
        let session = page.begin_transaction().await.unwrap();
        session.put(b"k".to_vec(), b"v".to_vec()).await.unwrap();
        session.rollback().await.unwrap();

        assert_eq!(
            session.put(b"k".to_vec(), b"v".to_vec()).await,
            Err(StoreError::NoTransactionInProgress)
        );
        assert!(page.is_empty());
    }
}

// ============================================================================
// Pagination
// ============================================================================

mod pagination {
    use super::*;

    #[tokio::test]
    async fn test_small_pages_cover_every_key_once() {
        let page = MemoryPage::with_page_size(7);
        seed(&page, 50).await;
        let snapshot = page.get_snapshot().await.unwrap();

        let keys = all_keys(&snapshot, None).await;
        assert_eq!(keys.len(), 50);
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), 50);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_prefix_pagination_stays_in_prefix() {
        let page = MemoryPage::with_page_size(3);
        seed(&page, 25).await;
        let snapshot = page.get_snapshot().await.unwrap();

        let keys = all_keys(&snapshot, Some(&b"key001"[..])).await;
        assert_eq!(keys.len(), 10);
        assert!(keys.iter().all(|k| k.starts_with(b"key001")));
    }

    #[tokio::test]
    async fn test_entries_and_keys_agree() {
        let page = MemoryPage::with_page_size(4);
        seed(&page, 10).await;
        let snapshot = page.get_snapshot().await.unwrap();

        let first = snapshot.get_entries(None, None).await.unwrap();
        let keys = snapshot.get_keys(None, None).await.unwrap();
        let entry_keys: Vec<_> = first.items.iter().map(|e| e.key.clone()).collect();
        assert_eq!(entry_keys, keys.items);
        assert_eq!(first.next_token, keys.next_token);
    }

    #[tokio::test]
    async fn test_foreign_token_rejected() {
        let page = MemoryPage::new();
        seed(&page, 2).await;
        let snapshot = page.get_snapshot().await.unwrap();

        let result = snapshot.get_keys(Some(&b"key"[..]), Some(&b"other"[..])).await;
        assert_eq!(result.err(), Some(StoreError::InvalidToken));
    }
}

// ============================================================================
// Ledger
// ============================================================================

mod ledger {
    use super::*;
    use docstore_core::PageId;

    #[tokio::test]
    async fn test_unknown_page_not_found() {
        let ledger = MemoryLedger::new();
        let result = ledger.get_page(PageId::new()).await;
        assert_eq!(result.err(), Some(StoreError::PageNotFound));
    }

    #[tokio::test]
    async fn test_pages_are_independent() {
        let ledger = MemoryLedger::with_page_size(2);
        let a = ledger.create_page();
        let b = ledger.create_page();
        seed(&a, 5).await;

        assert_eq!(a.len(), 5);
        assert!(b.is_empty());
        assert_eq!(ledger.page_count(), 2);
    }
}

// ============================================================================
// Concurrency
// ============================================================================

mod concurrency {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_in_one_session() {
        let page = MemoryPage::new();
        let session = page.begin_transaction().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..64u32 {
            let session = Arc::clone(&session);
            handles.push(tokio::spawn(async move {
                session
                    .put(i.to_be_bytes().to_vec(), b"v".to_vec())
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        session.commit().await.unwrap();

        assert_eq!(page.len(), 64);
        assert_eq!(page.current_version(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sessions_each_commit_atomically() {
        let page = MemoryPage::new();

        let mut handles = Vec::new();
        for writer in 0..8u8 {
            let page = page.clone();
            handles.push(tokio::spawn(async move {
                let session = page.begin_transaction().await.unwrap();
                for i in 0..10u8 {
                    session.put(vec![writer, i], vec![writer]).await.unwrap();
                }
                session.commit().await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(page.len(), 80);
        assert_eq!(page.current_version(), 8);
    }
}
