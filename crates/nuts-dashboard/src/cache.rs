//! Single-slot TTL snapshot cache.
//!
//! Each [`SnapshotCache`] holds at most one [`CacheEntry`]: an immutable value
//! paired with the instant it was computed. Readers clone an `Arc` to the
//! current entry, so a value is never observed with a mismatched timestamp.
//! Replacing the snapshot swaps the `Arc` in one write.
//!
//! Refreshes are single-flight: the first caller to find the slot stale takes
//! the refresh lock, and callers arriving meanwhile wait on that lock. Once in,
//! a waiter takes the leader's outcome: the fresh entry on success, a clone of
//! the leader's error on failure. Only a leader that was dropped mid-refresh
//! hands the work on to the next waiter.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::metrics::{CACHE_HITS, CACHE_REFRESHES, CACHE_REFRESH_FAILURES};

/// Source of the current instant. Injected so tests can move time by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A computed value and the instant it was stored.
#[derive(Debug)]
pub struct CacheEntry<T> {
    value: T,
    computed_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, computed_at: Instant) -> Self {
        Self { value, computed_at }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn computed_at(&self) -> Instant {
        self.computed_at
    }

    /// Fresh while strictly younger than `ttl`.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.computed_at) < ttl
    }
}

/// Read-through cache for one data kind, failing with `E` when a refresh fails.
pub struct SnapshotCache<T, E> {
    kind: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: RwLock<Option<Arc<CacheEntry<T>>>>,
    /// Bumped under the refresh lock each time a refresh runs to completion.
    completed: AtomicU64,
    /// Error of the last completed refresh, `None` if it succeeded.
    refresh_lock: tokio::sync::Mutex<Option<E>>,
}

impl<T, E> std::fmt::Debug for SnapshotCache<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("kind", &self.kind)
            .field("ttl", &self.ttl)
            .field("completed", &self.completed.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T, E: Clone> SnapshotCache<T, E> {
    /// Create an empty cache using the system clock.
    pub fn new(kind: &'static str, ttl: Duration) -> Self {
        Self::with_clock(kind, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(kind: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            kind,
            ttl,
            clock,
            slot: RwLock::new(None),
            completed: AtomicU64::new(0),
            refresh_lock: tokio::sync::Mutex::new(None),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The stored entry regardless of age.
    pub fn current(&self) -> Option<Arc<CacheEntry<T>>> {
        match self.slot.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => {
                tracing::error!(kind = self.kind, "cache slot lock poisoned, recovering");
                poisoned.into_inner().clone()
            }
        }
    }

    fn fresh(&self) -> Option<Arc<CacheEntry<T>>> {
        let now = self.clock.now();
        self.current().filter(|entry| entry.is_fresh(now, self.ttl))
    }

    fn store(&self, entry: Arc<CacheEntry<T>>) {
        match self.slot.write() {
            Ok(mut slot) => *slot = Some(entry),
            Err(poisoned) => {
                tracing::error!(kind = self.kind, "cache slot lock poisoned, recovering");
                *poisoned.into_inner() = Some(entry);
            }
        }
    }

    /// Return the current entry if fresh, otherwise run `refresh` and store its result.
    ///
    /// A failed refresh leaves the previous entry untouched and is returned to
    /// the caller, and to every caller that was already waiting on it. The stale
    /// value is never served in its place.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<Arc<CacheEntry<T>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(entry) = self.fresh() {
            CACHE_HITS.with_label_values(&[self.kind]).inc();
            return Ok(entry);
        }

        let seen = self.completed.load(Ordering::Acquire);
        let mut last_failure = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(entry) = self.fresh() {
            CACHE_HITS.with_label_values(&[self.kind]).inc();
            return Ok(entry);
        }
        if self.completed.load(Ordering::Acquire) != seen {
            if let Some(e) = last_failure.as_ref() {
                tracing::debug!(kind = self.kind, "sharing failed refresh with waiter");
                return Err(e.clone());
            }
        }

        tracing::debug!(kind = self.kind, "snapshot expired, refreshing");
        let outcome = match refresh().await {
            Ok(value) => {
                let entry = Arc::new(CacheEntry::new(value, self.clock.now()));
                self.store(entry.clone());
                CACHE_REFRESHES.with_label_values(&[self.kind]).inc();
                *last_failure = None;
                Ok(entry)
            }
            Err(e) => {
                CACHE_REFRESH_FAILURES.with_label_values(&[self.kind]).inc();
                *last_failure = Some(e.clone());
                Err(e)
            }
        };
        self.completed.fetch_add(1, Ordering::Release);
        outcome
    }
}
