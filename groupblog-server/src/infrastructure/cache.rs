//! Process-wide keyed cache for rendered listing pages.
//!
//! Entries expire strictly by time. Nothing invalidates them when posts
//! change, so a rendered page can show content that no longer exists until
//! its TTL runs out or [`ListingCache::clear`] is called.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;
use tracing::{debug, info};

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
struct CachedEntry {
    data: Bytes,
    expires_at: Instant,
}

pub struct ListingCache {
    store: DashMap<String, CachedEntry>,
    clock: Arc<dyn Clock>,
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: DashMap::new(),
            clock,
        }
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        let now = self.clock.now();
        {
            if let Some(entry) = self.store.get(key) {
                if now < entry.expires_at {
                    debug!(key, "listing cache hit");
                    return Some(entry.data.clone());
                }
            }
        }

        if self
            .store
            .remove_if(key, |_, entry| now >= entry.expires_at)
            .is_some()
        {
            debug!(key, "listing cache entry expired");
        }
        debug!(key, "listing cache miss");
        None
    }

    pub fn set(&self, key: &str, value: Bytes, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        self.store.insert(
            key.to_owned(),
            CachedEntry {
                data: value,
                expires_at,
            },
        );
        debug!(key, ttl_secs = ttl.as_secs(), "listing cache stored");
    }

    pub fn clear(&self) {
        self.store.clear();
        info!("listing cache cleared");
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use super::Clock;

    /// Clock that only moves when a test advances it.
    pub struct ManualClock {
        base: Instant,
        elapsed: Mutex<Duration>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                base: Instant::now(),
                elapsed: Mutex::new(Duration::ZERO),
            }
        }

        pub fn advance(&self, by: Duration) {
            *self.elapsed.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.base + *self.elapsed.lock().unwrap()
        }
    }
}
