//! Shared plumbing for the provider clients: request pacing, credential
//! rotation, and small TTL caches.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

/// Paces requests to a provider: one in flight at a time, spaced at least
/// `60s / max_per_minute` apart.
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    last_request: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(max_per_minute: usize) -> Self {
        let min_interval = if max_per_minute > 0 {
            Duration::from_secs_f64(60.0 / max_per_minute as f64)
        } else {
            Duration::ZERO
        };

        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            last_request: Arc::new(Mutex::new(None)),
            min_interval,
        }
    }

    /// Wait until a request may be sent. The returned guard must be held for
    /// the duration of the request.
    pub async fn acquire(&self) -> Result<RateLimitGuard, String> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| format!("rate limiter closed: {}", e))?;

        if !self.min_interval.is_zero() {
            let mut last = self.last_request.lock().await;
            if let Some(last_time) = *last {
                let elapsed = last_time.elapsed();
                if elapsed < self.min_interval {
                    tokio::time::sleep(self.min_interval - elapsed).await;
                }
            }
            *last = Some(Instant::now());
        }

        Ok(RateLimitGuard { _permit: permit })
    }
}

/// RAII guard returned by [`RateLimiter::acquire`].
pub struct RateLimitGuard {
    _permit: OwnedSemaphorePermit,
}

/// Ordered credential list with an atomic rotation cursor.
///
/// A 401/429 advances the cursor; the caller retries with the next key until
/// one full cycle has been exhausted.
pub struct KeyRing {
    keys: Vec<String>,
    index: AtomicUsize,
}

impl KeyRing {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys,
            index: AtomicUsize::new(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Currently selected key.
    pub fn current(&self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let i = self.index.load(Ordering::Relaxed) % self.keys.len();
        Some(&self.keys[i])
    }

    /// Rotate to the next key and return it.
    pub fn advance(&self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let i = self.index.fetch_add(1, Ordering::Relaxed) + 1;
        Some(&self.keys[i % self.keys.len()])
    }
}

/// A small TTL cache. Entries are immutable once inserted and replaced
/// wholesale when they expire.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, (V, Instant)>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read();
        entries.get(key).and_then(|(value, inserted)| {
            if inserted.elapsed() < self.ttl {
                Some(value.clone())
            } else {
                None
            }
        })
    }

    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write();
        // Opportunistic cleanup keeps the map from growing unbounded.
        if entries.len() >= 512 {
            entries.retain(|_, (_, inserted)| inserted.elapsed() < self.ttl);
        }
        entries.insert(key, (value, Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ring_rotates_and_wraps() {
        let ring = KeyRing::new(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(ring.current(), Some("a"));
        assert_eq!(ring.advance(), Some("b"));
        assert_eq!(ring.advance(), Some("c"));
        assert_eq!(ring.advance(), Some("a"));
        assert_eq!(ring.current(), Some("a"));
    }

    #[test]
    fn empty_key_ring_yields_none() {
        let ring = KeyRing::new(Vec::new());
        assert_eq!(ring.current(), None);
        assert_eq!(ring.advance(), None);
    }

    #[test]
    fn ttl_cache_expires() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_millis(0));
        cache.insert("k".to_string(), 1);
        assert_eq!(cache.get(&"k".to_string()), None);

        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("k".to_string(), 1);
        assert_eq!(cache.get(&"k".to_string()), Some(1));
    }
}
