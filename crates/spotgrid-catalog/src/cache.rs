//! Time-bounded catalog snapshots.
//!
//! Pricing data changes slowly compared to how often advice is requested,
//! so a built catalog is reused until it is older than the configured TTL.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use spotgrid_engine::Catalog;
use tracing::{debug, info};

use crate::builder::build_catalog;
use crate::error::CatalogResult;
use crate::source::CatalogSource;

/// Source of wall-clock seconds.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// A catalog together with the time it was built.
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub fetched_at: u64,
    pub catalog: Arc<Catalog>,
}

/// Caches the catalog built from a source.
pub struct SnapshotCache<S> {
    source: S,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    current: RwLock<Option<Arc<CatalogSnapshot>>>,
}

impl<S: CatalogSource> SnapshotCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self::with_clock(source, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(source: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            ttl,
            clock,
            current: RwLock::new(None),
        }
    }

    /// Current snapshot, refetched from the source once it has expired.
    pub fn snapshot(&self) -> CatalogResult<Arc<CatalogSnapshot>> {
        let now = self.clock.now_secs();

        if let Some(snapshot) = self.fresh(now) {
            debug!(source = self.source.name(), "catalog cache hit");
            return Ok(snapshot);
        }

        let catalog = build_catalog(self.source.fetch()?)?;
        let snapshot = Arc::new(CatalogSnapshot {
            fetched_at: now,
            catalog: Arc::new(catalog),
        });
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());

        info!(
            source = self.source.name(),
            regions = snapshot.catalog.len(),
            "refreshed catalog snapshot"
        );
        Ok(snapshot)
    }

    /// Drop the cached snapshot so the next call refetches.
    pub fn invalidate(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn fresh(&self, now: u64) -> Option<Arc<CatalogSnapshot>> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        current
            .as_ref()
            .filter(|s| now.saturating_sub(s.fetched_at) < self.ttl.as_secs())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    use spotgrid_core::{Instance, Lifecycle};

    use crate::source::StaticSource;

    struct FakeClock(AtomicU64);

    impl Clock for FakeClock {
        fn now_secs(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Counts how often it is fetched.
    struct CountingSource {
        inner: StaticSource,
        fetches: AtomicUsize,
    }

    impl CatalogSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        fn fetch(&self) -> CatalogResult<Vec<Instance>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch()
        }
    }

    fn source() -> CountingSource {
        CountingSource {
            inner: StaticSource::new(vec![Instance {
                id: "t3.micro-od".to_string(),
                name: "t3.micro".to_string(),
                memory_gb: 1.0,
                vcpu: 2.0,
                region: "us-east-1".to_string(),
                az: "us-east-1a".to_string(),
                os: "linux".to_string(),
                price_per_hour: 0.0104,
                revocation_probability: 0.0,
                lifecycle: Lifecycle::Permanent,
            }]),
            fetches: AtomicUsize::new(0),
        }
    }

    #[test]
    fn refetches_only_after_expiry() {
        let clock = Arc::new(FakeClock(AtomicU64::new(1_000)));
        let cache = SnapshotCache::with_clock(source(), Duration::from_secs(60), clock.clone());

        let first = cache.snapshot().unwrap();
        assert_eq!(first.fetched_at, 1_000);
        assert_eq!(first.catalog.len(), 1);

        clock.0.store(1_059, Ordering::SeqCst);
        let second = cache.snapshot().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.source.fetches.load(Ordering::SeqCst), 1);

        clock.0.store(1_060, Ordering::SeqCst);
        let third = cache.snapshot().unwrap();
        assert_eq!(third.fetched_at, 1_060);
        assert_eq!(cache.source.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_forces_refetch() {
        let clock = Arc::new(FakeClock(AtomicU64::new(0)));
        let cache = SnapshotCache::with_clock(source(), Duration::from_secs(3600), clock);

        cache.snapshot().unwrap();
        cache.invalidate();
        cache.snapshot().unwrap();
        assert_eq!(cache.source.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn zero_ttl_never_caches() {
        let clock = Arc::new(FakeClock(AtomicU64::new(5)));
        let cache = SnapshotCache::with_clock(source(), Duration::ZERO, clock);

        cache.snapshot().unwrap();
        cache.snapshot().unwrap();
        assert_eq!(cache.source.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn system_clock_is_after_2024() {
        assert!(SystemClock.now_secs() > 1_704_067_200);
    }
}
