use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::core::snapshot::RateSnapshot;
use crate::core::source::RateSource;

// Caching wrapper for a RateSource
//
// Holds the latest snapshot and refreshes it through the inner source once
// it goes stale. Refreshes are serialized behind a dedicated lock with a
// double-checked staleness gate, so N concurrent stale observers produce at
// most one upstream fetch. The lock is not held while copying the snapshot
// out to callers.
pub struct RateCache<S: RateSource> {
    source: S,
    snapshot: RwLock<RateSnapshot>,
    refresh: Mutex<()>,
}

impl<S: RateSource> RateCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            snapshot: RwLock::new(RateSnapshot::empty()),
            refresh: Mutex::new(()),
        }
    }

    /// Returns a copy of the current snapshot, refreshing it first when
    /// stale. A failed refresh keeps the previous snapshot in place; callers
    /// never see the error, only stale or empty data.
    pub async fn get_rates(&self) -> RateSnapshot {
        if self.snapshot.read().await.is_stale(Utc::now()) {
            let _guard = self.refresh.lock().await;
            // Re-check: a refresh may have completed while waiting on the
            // lock. The new snapshot can itself report a stale timestamp, in
            // which case the next lock holder fetches again.
            if self.snapshot.read().await.is_stale(Utc::now()) {
                match self.source.fetch_rates().await {
                    Ok(fresh) => {
                        debug!(base = %fresh.base, "Refreshed rate snapshot");
                        *self.snapshot.write().await = fresh;
                    }
                    Err(e) => {
                        warn!(error = %e, "Rate refresh failed, keeping previous snapshot");
                    }
                }
            }
        }

        self.snapshot.read().await.clone()
    }

    /// Conversion rate between two currencies via the cached snapshot.
    pub async fn conversion_rate(&self, from: &str, to: &str) -> (f64, bool) {
        self.get_rates().await.conversion_rate(from, to)
    }
}
