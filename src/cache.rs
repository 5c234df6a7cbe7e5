//! Short-lived decision cache.
//!
//! A bounded, expiring association from address to block/allow
//! verdict. Keys are a one-way hash of the address string; this is a
//! performance cache, not a security boundary, so hash collisions are
//! accepted. Expiry is lazy: expired entries read as misses and are
//! swept opportunistically on writes, no background task.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::trace;

/// Default decision lifetime: one hour, no refresh-on-read.
pub const CACHE_TIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    decision: bool,
    expires_at: Instant,
}

/// Concurrent TTL map of per-address verdicts.
///
/// Reads take a shared lock; writes are last-writer-wins, which is
/// safe here because a fresh evaluation for the same address within
/// the TTL window produces the same decision for a stable rule set.
#[derive(Debug, Default)]
pub struct DecisionCache {
    entries: RwLock<HashMap<u64, CacheEntry>>,
}

impl DecisionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached verdict for `addr`, or `None` on miss or expiry.
    pub fn get(&self, addr: &str) -> Option<bool> {
        self.get_at(addr, Instant::now())
    }

    /// Store a verdict for `addr`, valid for `ttl` from now.
    pub fn set(&self, addr: &str, decision: bool, ttl: Duration) {
        self.set_at(addr, decision, ttl, Instant::now());
    }

    fn get_at(&self, addr: &str, now: Instant) -> Option<bool> {
        let entries = self.entries.read().expect("decision cache lock poisoned");
        entries.get(&key_for(addr)).and_then(|entry| {
            if now < entry.expires_at {
                Some(entry.decision)
            } else {
                None
            }
        })
    }

    fn set_at(&self, addr: &str, decision: bool, ttl: Duration, now: Instant) {
        let mut entries = self.entries.write().expect("decision cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        let swept = before - entries.len();
        if swept > 0 {
            trace!("Swept {} expired cache entries", swept);
        }
        entries.insert(
            key_for(addr),
            CacheEntry {
                decision,
                expires_at: now + ttl,
            },
        );
    }
}

/// Stable one-way hash of the address string.
fn key_for(addr: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    addr.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_on_empty_cache() {
        let cache = DecisionCache::new();
        assert_eq!(cache.get("1.2.3.4"), None);
    }

    #[test]
    fn test_set_then_get() {
        let cache = DecisionCache::new();
        cache.set("1.2.3.4", true, CACHE_TIME);
        cache.set("5.6.7.8", false, CACHE_TIME);
        assert_eq!(cache.get("1.2.3.4"), Some(true));
        assert_eq!(cache.get("5.6.7.8"), Some(false));
        assert_eq!(cache.get("9.9.9.9"), None);
    }

    #[test]
    fn test_entry_lives_until_exactly_ttl() {
        let cache = DecisionCache::new();
        let t0 = Instant::now();
        cache.set_at("1.2.3.4", true, CACHE_TIME, t0);

        // Just inside the window.
        let almost = t0 + CACHE_TIME - Duration::from_millis(1);
        assert_eq!(cache.get_at("1.2.3.4", almost), Some(true));

        // At exactly the TTL boundary the entry is a miss.
        assert_eq!(cache.get_at("1.2.3.4", t0 + CACHE_TIME), None);
        assert_eq!(
            cache.get_at("1.2.3.4", t0 + CACHE_TIME + Duration::from_secs(1)),
            None
        );
    }

    #[test]
    fn test_no_refresh_on_read() {
        let cache = DecisionCache::new();
        let t0 = Instant::now();
        cache.set_at("1.2.3.4", true, CACHE_TIME, t0);
        // Reads inside the window must not extend the lifetime.
        let mid = t0 + CACHE_TIME / 2;
        assert_eq!(cache.get_at("1.2.3.4", mid), Some(true));
        assert_eq!(cache.get_at("1.2.3.4", t0 + CACHE_TIME), None);
    }

    #[test]
    fn test_last_writer_wins() {
        let cache = DecisionCache::new();
        cache.set("1.2.3.4", true, CACHE_TIME);
        cache.set("1.2.3.4", false, CACHE_TIME);
        assert_eq!(cache.get("1.2.3.4"), Some(false));
    }

    #[test]
    fn test_expired_entries_swept_on_set() {
        let cache = DecisionCache::new();
        let t0 = Instant::now();
        cache.set_at("1.2.3.4", true, Duration::from_secs(1), t0);
        cache.set_at("5.6.7.8", true, CACHE_TIME, t0 + Duration::from_secs(2));
        let entries = cache.entries.read().unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_distinct_addresses_get_distinct_entries() {
        let cache = DecisionCache::new();
        cache.set("1.2.3.4", true, CACHE_TIME);
        cache.set("5.6.7.8", false, CACHE_TIME);
        assert_eq!(cache.entries.read().unwrap().len(), 2);
    }

    #[test]
    fn test_key_hash_is_stable() {
        assert_eq!(key_for("1.2.3.4"), key_for("1.2.3.4"));
        assert_ne!(key_for("1.2.3.4"), key_for("1.2.3.5"));
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(DecisionCache::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    let addr = format!("10.{}.0.{}", i, j);
                    cache.set(&addr, j % 2 == 0, CACHE_TIME);
                    assert_eq!(cache.get(&addr), Some(j % 2 == 0));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.entries.read().unwrap().len(), 800);
    }
}
