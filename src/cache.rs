//! Scan result caching keyed by corpus and registry fingerprints.
//!
//! Both the summary view and the detail lookup need a full aggregation. The
//! cache keeps the latest one and hands it to every caller whose key still
//! matches; a concurrent caller for the same key awaits the scan already in
//! flight instead of starting another.

use crate::fingerprint::Fingerprint;
use crate::scan::UsageIndex;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Result of one aggregation. Errors are strings so the future can be shared.
pub type ScanResult = Result<Arc<UsageIndex>, String>;

/// Type alias for shared scan futures.
type SharedScanFuture = Shared<BoxFuture<'static, ScanResult>>;

/// Identity of the inputs a scan was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanKey {
    /// Corpus state at scan time
    pub corpus: Fingerprint,
    /// Registry membership at scan time
    pub registry: Fingerprint,
}

/// Single-entry scan cache with in-flight de-duplication.
#[derive(Default)]
pub struct ScanCache {
    /// Latest completed scan
    entry: RwLock<Option<(ScanKey, Arc<UsageIndex>)>>,

    /// In-flight scans (can be awaited by multiple callers)
    in_flight: Mutex<HashMap<ScanKey, SharedScanFuture>>,
}

impl std::fmt::Debug for ScanCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanCache")
            .field("cached_key", &self.entry.try_read().ok().and_then(|e| e.as_ref().map(|(k, _)| *k)))
            .finish_non_exhaustive()
    }
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached scan for `key`, or run `scan` to produce it.
    ///
    /// This:
    /// 1. Checks the cached entry
    /// 2. Checks for an in-flight scan with the same key (awaits if found)
    /// 3. Starts a new scan otherwise
    ///
    /// Whichever caller first sees the shared scan complete publishes it and
    /// retires the in-flight entry. The caller that started it may have been
    /// dropped by then.
    pub async fn get_or_scan<F>(&self, key: ScanKey, scan: F) -> ScanResult
    where
        F: FnOnce() -> BoxFuture<'static, ScanResult>,
    {
        // 1. Check cache first
        if let Some(index) = self.get(key).await {
            tracing::debug!("Scan cache hit for corpus {}", key.corpus);
            return Ok(index);
        }

        // 2. Join an in-flight scan, or register ours
        let future = {
            let mut in_flight = self.in_flight.lock().await;
            // A scan may have been published since the first check
            if let Some(index) = self.get(key).await {
                return Ok(index);
            }
            if let Some(existing) = in_flight.get(&key) {
                tracing::debug!("Awaiting in-flight scan for corpus {}", key.corpus);
                existing.clone()
            } else {
                tracing::debug!("Scan cache miss for corpus {}, scanning", key.corpus);
                let shared = scan().shared();
                in_flight.insert(key, shared.clone());
                shared
            }
        };

        let result = future.clone().await;
        self.retire(key, &future, &result).await;
        result
    }

    /// Publish a finished scan and drop its in-flight entry, once per scan.
    async fn retire(&self, key: ScanKey, future: &SharedScanFuture, result: &ScanResult) {
        let mut in_flight = self.in_flight.lock().await;
        let current = in_flight
            .get(&key)
            .is_some_and(|registered| registered.ptr_eq(future));
        if !current {
            return;
        }

        // Publish while the in-flight lock is held so no caller sees neither
        if let Ok(index) = result {
            *self.entry.write().await = Some((key, index.clone()));
        }
        in_flight.remove(&key);
    }

    /// Cached scan for `key`, if the latest entry was computed under it.
    pub async fn get(&self, key: ScanKey) -> Option<Arc<UsageIndex>> {
        self.entry
            .read()
            .await
            .as_ref()
            .filter(|(cached, _)| *cached == key)
            .map(|(_, index)| index.clone())
    }

    /// Drop the cached entry.
    pub async fn clear(&self) {
        *self.entry.write().await = None;
    }

    /// Check if a scan is in progress for `key`.
    pub async fn is_scanning(&self, key: ScanKey) -> bool {
        self.in_flight.lock().await.contains_key(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModuleId, UsageRecord};
    use assert2::{check, let_assert};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn key(corpus: u64) -> ScanKey {
        ScanKey {
            corpus: Fingerprint::new(corpus),
            registry: Fingerprint::new(1),
        }
    }

    fn scan_counting(counter: Arc<AtomicUsize>) -> impl FnOnce() -> BoxFuture<'static, ScanResult> {
        move || {
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                let index: UsageIndex = [UsageRecord::empty(ModuleId::new("vc_row"))].into_iter().collect();
                Ok(Arc::new(index))
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_same_key_reuses_scan() {
        let cache = ScanCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        cache.get_or_scan(key(1), scan_counting(counter.clone())).await.unwrap();
        cache.get_or_scan(key(1), scan_counting(counter.clone())).await.unwrap();

        check!(counter.load(Ordering::SeqCst) == 1);
    }

    #[tokio::test]
    async fn test_changed_key_rescans() {
        let cache = ScanCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        cache.get_or_scan(key(1), scan_counting(counter.clone())).await.unwrap();
        cache.get_or_scan(key(2), scan_counting(counter.clone())).await.unwrap();

        check!(counter.load(Ordering::SeqCst) == 2);
        check!(cache.get(key(1)).await.is_none());
        check!(cache.get(key(2)).await.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_scan() {
        let cache = ScanCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.get_or_scan(key(7), scan_counting(counter.clone())),
            cache.get_or_scan(key(7), scan_counting(counter.clone())),
        );

        check!(a.is_ok());
        check!(b.is_ok());
        check!(counter.load(Ordering::SeqCst) == 1);
        check!(!cache.is_scanning(key(7)).await);
    }

    #[tokio::test]
    async fn test_scan_survives_cancelled_starter() {
        let cache = ScanCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let slow_scan = {
            let counter = counter.clone();
            move || {
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    let index: UsageIndex = [UsageRecord::empty(ModuleId::new("vc_row"))].into_iter().collect();
                    Ok(Arc::new(index))
                }
                .boxed()
            }
        };

        // The starter gives up before the scan finishes
        let abandoned = tokio::time::timeout(Duration::from_millis(10), cache.get_or_scan(key(5), slow_scan)).await;
        check!(abandoned.is_err());
        check!(cache.is_scanning(key(5)).await);

        let_assert!(Ok(index) = cache.get_or_scan(key(5), scan_counting(counter.clone())).await);
        check!(index.contains("vc_row"));
        check!(counter.load(Ordering::SeqCst) == 1);
        check!(cache.get(key(5)).await.is_some());
        check!(!cache.is_scanning(key(5)).await);
    }

    #[tokio::test]
    async fn test_failed_scan_is_not_cached() {
        let cache = ScanCache::new();
        let result = cache
            .get_or_scan(key(3), || async { Err("scan task panicked".to_string()) }.boxed())
            .await;
        let_assert!(Err(message) = result);
        check!(message.contains("panicked"));
        check!(cache.get(key(3)).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_drops_entry() {
        let cache = ScanCache::new();
        let counter = Arc::new(AtomicUsize::new(0));
        cache.get_or_scan(key(1), scan_counting(counter.clone())).await.unwrap();
        cache.clear().await;
        check!(cache.get(key(1)).await.is_none());
    }
}
