//! Bounded caches whose entries expire after a fixed time-to-live.

use std::{
    collections::VecDeque,
    hash::Hash,
    num::NonZeroUsize,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use quanta::{Clock, Instant};
use quick_cache::sync::Cache;

#[derive(Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// A bounded cache whose entries expire a fixed duration after insertion.
///
/// Entries live in a [`quick_cache`] cache. Insertions are also queued in order; since every entry has the same
/// time-to-live, the front of the queue always holds the next entry to expire, and expired entries are dropped from
/// the front whenever the cache is read or written. When the cache is full, inserting a new key evicts the oldest
/// entry.
pub struct TtlCache<K, V> {
    entries: Cache<K, Entry<V>>,

    // A key inserted again, or removed, leaves its earlier records behind. They are skipped on expiry by comparing
    // insertion times with the cached entry.
    insertions: Mutex<VecDeque<(Instant, K)>>,
    capacity: NonZeroUsize,
    ttl: Duration,
    clock: Clock,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, Clock::new())
    }

    /// Creates a cache reading time from the given clock.
    pub fn with_clock(capacity: NonZeroUsize, ttl: Duration, clock: Clock) -> Self {
        Self {
            entries: Cache::new(capacity.get()),
            insertions: Mutex::new(VecDeque::with_capacity(capacity.get())),
            capacity,
            ttl,
            clock,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drops expired entries and returns the insertion queue, locked.
    fn expire(&self) -> MutexGuard<'_, VecDeque<(Instant, K)>> {
        let mut insertions = self.insertions.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = self.clock.now();
        while insertions
            .front()
            .is_some_and(|(inserted_at, _)| now.duration_since(*inserted_at) >= self.ttl)
        {
            if let Some((inserted_at, key)) = insertions.pop_front() {
                self.remove_if_inserted_at(&key, inserted_at);
            }
        }
        insertions
    }

    fn remove_if_inserted_at(&self, key: &K, inserted_at: Instant) {
        let current = self
            .entries
            .peek(key)
            .is_some_and(|entry| entry.inserted_at == inserted_at);
        if current {
            self.entries.remove(key);
        }
    }

    fn insert_locked(&self, insertions: &mut VecDeque<(Instant, K)>, key: K, value: V) {
        let inserted_at = self.clock.now();
        self.entries.insert(key.clone(), Entry { value, inserted_at });
        insertions.push_back((inserted_at, key));
    }

    /// Number of entries that have not expired.
    pub fn len(&self) -> usize {
        let _insertions = self.expire();
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let _insertions = self.expire();
        self.entries.get(key).map(|entry| entry.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        let _insertions = self.expire();
        self.entries.peek(key).is_some()
    }

    /// Inserts or replaces an entry, restarting its time-to-live.
    pub fn insert(&self, key: K, value: V) {
        let mut insertions = self.expire();
        if self.entries.peek(&key).is_none() {
            while self.entries.len() >= self.capacity.get() {
                let Some((inserted_at, oldest)) = insertions.pop_front() else {
                    break;
                };
                self.remove_if_inserted_at(&oldest, inserted_at);
            }
        }
        self.insert_locked(&mut insertions, key, value);
    }

    /// Inserts an entry only if the key is absent and the cache has room, returning whether it was inserted.
    pub fn try_insert(&self, key: K, value: V) -> bool {
        let mut insertions = self.expire();
        if self.entries.len() >= self.capacity.get() || self.entries.peek(&key).is_some() {
            return false;
        }
        self.insert_locked(&mut insertions, key, value);
        true
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let _insertions = self.expire();
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }

    pub fn clear(&self) {
        let mut insertions = self.expire();
        insertions.clear();
        self.entries.clear();
    }
}

/// Admits each key at most once per time-to-live window, and at most `capacity` keys per window.
///
/// Used to throttle work per key, such as sampling each distinct query once per interval.
pub struct RateLimitingTtlCache<K> {
    inner: TtlCache<K, ()>,
}

impl<K> RateLimitingTtlCache<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            inner: TtlCache::new(capacity, ttl),
        }
    }

    pub fn with_clock(capacity: NonZeroUsize, ttl: Duration, clock: Clock) -> Self {
        Self {
            inner: TtlCache::with_clock(capacity, ttl, clock),
        }
    }

    /// Returns `true` if the key is absent (or expired) and the cache is not full, recording the key.
    pub fn acquire(&self, key: K) -> bool {
        self.inner.try_insert(key, ())
    }

    /// Number of keys acquired within the current time-to-live window.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&self) {
        self.inner.clear()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("should be non-zero")
    }

    #[test]
    fn entries_expire_after_ttl() {
        let (clock, mock) = Clock::mock();
        let cache = TtlCache::with_clock(capacity(4), Duration::from_secs(10), clock);

        cache.insert("QM1", true);
        assert_eq!(cache.get(&"QM1"), Some(true));

        mock.increment(Duration::from_secs(9));
        assert!(cache.contains(&"QM1"));

        mock.increment(Duration::from_secs(1));
        assert_eq!(cache.get(&"QM1"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn full_cache_evicts_oldest_entry() {
        let (clock, mock) = Clock::mock();
        let cache = TtlCache::with_clock(capacity(2), Duration::from_secs(60), clock);

        cache.insert(1, "a");
        mock.increment(Duration::from_secs(1));
        cache.insert(2, "b");
        mock.increment(Duration::from_secs(1));
        cache.insert(3, "c");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&3), Some("c"));
    }

    #[test]
    fn rate_limiting_acquire() {
        let (clock, mock) = Clock::mock();
        let cache = RateLimitingTtlCache::with_clock(capacity(2), Duration::from_secs(10), clock);

        assert!(cache.acquire("select 1"));
        assert!(!cache.acquire("select 1"));
        assert!(cache.acquire("select 2"));
        assert!(!cache.acquire("select 3"), "full cache must reject new keys");
        assert_eq!(cache.len(), 2);

        mock.increment(Duration::from_secs(10));
        assert_eq!(cache.len(), 0);
        assert!(cache.acquire("select 3"));
        assert!(cache.acquire("select 1"));
    }

    #[test]
    fn replaced_entry_outlives_its_first_insertion() {
        let (clock, mock) = Clock::mock();
        let cache = TtlCache::with_clock(capacity(2), Duration::from_secs(10), clock);

        cache.insert("QM1", 1);
        mock.increment(Duration::from_secs(6));
        cache.insert("QM1", 2);
        cache.insert("QM2", 3);

        mock.increment(Duration::from_secs(6));
        assert_eq!(cache.get(&"QM1"), Some(2));
        assert_eq!(cache.len(), 2);

        cache.insert("QM3", 4);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"QM3"), Some(4));
        assert_eq!(cache.remove(&"QM1"), None);
        assert_eq!(cache.get(&"QM2"), Some(3));
    }

    #[test]
    fn removed_keys_free_capacity() {
        let cache = TtlCache::new(capacity(1), Duration::from_secs(60));

        assert!(cache.try_insert("QM1", ()));
        assert!(!cache.try_insert("QM2", ()));
        assert_eq!(cache.remove(&"QM1"), Some(()));
        assert!(cache.try_insert("QM2", ()));

        cache.clear();
        assert!(cache.is_empty());
    }

    proptest! {
        #[test]
        fn property_test_live_entries_never_exceed_capacity(keys in proptest::collection::vec(0u8..32, 0..64), cap in 1usize..8) {
            let (clock, mock) = Clock::mock();
            let cache = RateLimitingTtlCache::with_clock(capacity(cap), Duration::from_secs(5), clock);
            for key in keys {
                cache.acquire(key);
                mock.increment(Duration::from_secs(1));
                prop_assert!(cache.len() <= cap);
            }
        }
    }
}
