#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared primitives for the live-data provider clients.
//!
//! Every upstream client in the system follows the same shape: a short-TTL
//! single-slot cache in front of a fetch that degrades to locally generated
//! data instead of failing. [`TtlCache`] is the cache cell and [`Sourced`]
//! tags a value with the branch that produced it, so callers and tests can
//! distinguish provider data from fallback data without parsing logs.

use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

/// A value tagged with the branch that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sourced<T> {
    /// The value came from the live upstream provider.
    Live(T),
    /// The upstream was unavailable or unconfigured and the value was
    /// generated locally.
    Fallback(T),
}

impl<T> Sourced<T> {
    /// Consumes the tag and returns the inner value.
    pub fn into_inner(self) -> T {
        match self {
            Self::Live(value) | Self::Fallback(value) => value,
        }
    }

    /// Returns a reference to the inner value.
    pub const fn get(&self) -> &T {
        match self {
            Self::Live(value) | Self::Fallback(value) => value,
        }
    }

    /// Returns `true` if the value was generated locally.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Returns `true` if the value came from the live upstream.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

struct Entry<T> {
    value: Sourced<T>,
    expires_at: Instant,
}

/// A single-slot cache holding one [`Sourced`] value with an expiry instant.
///
/// The slot is the only mutable shared state inside a provider client. Reads
/// take the read half of the lock; a refresh holds the write half across the
/// upstream call, so concurrent callers hitting an expired slot block on the
/// lock and re-check instead of dispatching duplicate upstream requests
/// (double-checked locking as a single-flight).
pub struct TtlCache<T> {
    ttl: Duration,
    slot: RwLock<Option<Entry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    /// Creates an empty cache whose entries live for `ttl` after a refresh.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::const_new(None),
        }
    }

    /// Returns the cached value if one exists and has not expired.
    pub async fn get(&self) -> Option<Sourced<T>> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    /// Returns the cached value, or runs `refresh` to produce a new one.
    ///
    /// The refreshed value is stored with the configured TTL regardless of
    /// which [`Sourced`] branch it carries, so a fallback reading also
    /// shields the upstream from repeated calls while it is down.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Sourced<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Sourced<T>>,
    {
        if let Some(cached) = self.get().await {
            return cached;
        }

        let mut slot = self.slot.write().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(entry) = slot.as_ref() {
            if Instant::now() < entry.expires_at {
                return entry.value.clone();
            }
        }

        let value = refresh().await;
        *slot = Some(Entry {
            value: value.clone(),
            expires_at: Instant::now() + self.ttl,
        });

        value
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn serves_cached_value_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_refresh(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Sourced::Live(42)
                })
                .await;
            assert_eq!(value, Sourced::Live(42));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_after_expiry() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let refresh = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Sourced::Live(1)
        };

        cache.get_or_refresh(refresh).await;
        tokio::time::advance(Duration::from_secs(61)).await;
        cache.get_or_refresh(refresh).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn preserves_fallback_tag_on_cache_hit() {
        let cache = TtlCache::new(Duration::from_secs(60));

        let first = cache.get_or_refresh(|| async { Sourced::Fallback(7) }).await;
        assert!(first.is_fallback());

        let second = cache.get_or_refresh(|| async { Sourced::Live(8) }).await;
        assert!(second.is_fallback());
        assert_eq!(*second.get(), 7);
    }

    #[tokio::test]
    async fn concurrent_misses_refresh_once() {
        let cache = Arc::new(TtlCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_refresh(|| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Sourced::Live(9)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Sourced::Live(9));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
