use std::sync::Arc;

use crate::aggregate::{aggregate, CountPerMoment};
use crate::cache::{CacheEntry, Clock, SnapshotCache, SystemClock};
use crate::constants::{CACHE_TTL, DEFAULT_MAX_PAGES};
use crate::diagnostics::{fetch_facts, Fact};
use crate::error::DashboardError;
use crate::node::NodeApi;
use crate::transactions::PageWalker;

/// The two cached data kinds served to the frontend, backed by one node.
pub struct Dashboard<N> {
    node: N,
    max_pages: Option<u64>,
    facts: SnapshotCache<Vec<Fact>, DashboardError>,
    txs_over_time: SnapshotCache<Vec<CountPerMoment>, DashboardError>,
}

impl<N: NodeApi> Dashboard<N> {
    pub fn new(node: N) -> Self {
        Self::with_clock(node, Arc::new(SystemClock))
    }

    pub fn with_clock(node: N, clock: Arc<dyn Clock>) -> Self {
        Self {
            node,
            max_pages: Some(DEFAULT_MAX_PAGES),
            facts: SnapshotCache::with_clock("facts", CACHE_TTL, clock.clone()),
            txs_over_time: SnapshotCache::with_clock("txs_over_time", CACHE_TTL, clock),
        }
    }

    /// Page ceiling for transaction walks. `None` removes it.
    pub fn max_pages(mut self, max_pages: Option<u64>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    /// Summary facts, refreshed from the diagnostics endpoint once the snapshot expires.
    pub async fn facts(&self) -> Result<Arc<CacheEntry<Vec<Fact>>>, DashboardError> {
        self.facts
            .get_or_refresh(|| fetch_facts(&self.node))
            .await
    }

    /// Transactions per day, recomputed by walking the full history once the snapshot expires.
    pub async fn txs_over_time(
        &self,
    ) -> Result<Arc<CacheEntry<Vec<CountPerMoment>>>, DashboardError> {
        self.txs_over_time
            .get_or_refresh(|| async {
                let records = PageWalker::new(&self.node)
                    .max_pages(self.max_pages)
                    .walk_all()
                    .await?;
                let series = aggregate(&records);
                tracing::info!(
                    transactions = records.len(),
                    days = series.len(),
                    "refreshed transactions over time"
                );
                Ok::<_, DashboardError>(series)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::ManualClock;
    use crate::diagnostics::DiagnosticsSnapshot;
    use crate::envelope::tests::envelope_at;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingNode {
        diagnostics_calls: AtomicUsize,
        transaction_calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl NodeApi for CountingNode {
        async fn diagnostics(&self) -> Result<DiagnosticsSnapshot, DashboardError> {
            let n = self.diagnostics_calls.fetch_add(1, Ordering::SeqCst) as i64;
            if self.failing.load(Ordering::SeqCst) {
                return Err(DashboardError::UpstreamUnavailable("down".into()));
            }
            let mut snapshot = DiagnosticsSnapshot::default();
            snapshot.network.connections.connected_peers_count = n + 1;
            Ok(snapshot)
        }

        async fn transactions(&self, start: u64, _end: u64) -> Result<Vec<String>, DashboardError> {
            self.transaction_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(DashboardError::UpstreamUnavailable("down".into()));
            }
            if start == 0 {
                Ok(vec![
                    envelope_at(1_704_416_400), // 2024-01-05T01:00:00Z
                    envelope_at(1_704_499_199), // 2024-01-05T23:59:59Z
                    envelope_at(1_704_499_201), // 2024-01-06T00:00:01Z
                ])
            } else {
                Ok(vec![])
            }
        }
    }

    fn dashboard() -> (Dashboard<CountingNode>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (
            Dashboard::with_clock(CountingNode::default(), clock.clone()),
            clock,
        )
    }

    #[tokio::test]
    async fn test_facts_are_cached_within_ttl() {
        let (dashboard, clock) = dashboard();

        let first = dashboard.facts().await.unwrap();
        clock.advance(Duration::from_secs(9));
        let second = dashboard.facts().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(dashboard.node().diagnostics_calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(1));
        let third = dashboard.facts().await.unwrap();
        assert_eq!(third.value()[0].value, 2);
        assert_eq!(dashboard.node().diagnostics_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_series_is_bucketed_by_day() {
        let (dashboard, _clock) = dashboard();

        let series = dashboard.txs_over_time().await.unwrap();
        let counts: Vec<(i64, u64)> = series
            .value()
            .iter()
            .map(|c| (c.moment.timestamp(), c.count))
            .collect();
        assert_eq!(counts, vec![(1_704_412_800, 2), (1_704_499_200, 1)]);
        assert_eq!(dashboard.node().transaction_calls.load(Ordering::SeqCst), 2);

        dashboard.txs_over_time().await.unwrap();
        assert_eq!(dashboard.node().transaction_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_is_not_served_stale() {
        let (dashboard, clock) = dashboard();
        dashboard.facts().await.unwrap();

        clock.advance(Duration::from_secs(10));
        dashboard.node().failing.store(true, Ordering::SeqCst);
        let err = dashboard.facts().await.unwrap_err();
        assert!(err.is_upstream_failure());

        dashboard.node().failing.store(false, Ordering::SeqCst);
        let recovered = dashboard.facts().await.unwrap();
        assert_eq!(recovered.value()[0].value, 3);
    }

    #[tokio::test]
    async fn test_kinds_are_cached_independently() {
        let (dashboard, _clock) = dashboard();
        dashboard.facts().await.unwrap();
        assert_eq!(dashboard.node().transaction_calls.load(Ordering::SeqCst), 0);

        dashboard.txs_over_time().await.unwrap();
        dashboard.facts().await.unwrap();
        assert_eq!(dashboard.node().diagnostics_calls.load(Ordering::SeqCst), 1);
    }
}
