//! Bounded LRU cache with optional per-entry TTL and eviction callback
//! (spec.md §4.I). O(1) get/set via a hashmap plus a recency list.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Option<Duration>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.ttl.is_some_and(|ttl| now.duration_since(self.inserted_at) >= ttl)
    }
}

struct Inner<K, V> {
    map: HashMap<K, Entry<V>>,
    /// Recency order, most-recently-used at the front. May contain stale
    /// keys already removed from `map`; `touch`/`evict_if_needed` clean
    /// those up lazily rather than paying for a linked-list removal.
    order: VecDeque<K>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Bounded, thread-safe LRU cache. `max_size` of `0` means unbounded.
pub struct LruCache<K, V> {
    max_size: usize,
    default_ttl: Option<Duration>,
    on_evict: Option<Box<dyn Fn(&K, &V) + Send + Sync>>,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            default_ttl: None,
            on_evict: None,
            inner: Mutex::new(Inner { map: HashMap::new(), order: VecDeque::new(), hits: 0, misses: 0, evictions: 0 }),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn with_eviction_callback(mut self, callback: impl Fn(&K, &V) + Send + Sync + 'static) -> Self {
        self.on_evict = Some(Box::new(callback));
        self
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock().unwrap();
        let now = Instant::now();
        let expired = inner.map.get(key).is_some_and(|e| e.is_expired(now));
        if expired {
            let entry = inner.map.remove(key);
            if let (Some(cb), Some(entry)) = (&self.on_evict, entry) {
                cb(key, &entry.value);
            }
            inner.misses += 1;
            return None;
        }
        match inner.map.get(key) {
            Some(entry) => {
                let value = entry.value.clone();
                inner.order.push_front(key.clone());
                inner.hits += 1;
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, self.default_ttl)
    }

    pub fn set_with_ttl(&self, key: K, value: V, ttl: Option<Duration>) {
        let mut inner = self.inner.lock().unwrap();
        inner.map.insert(key.clone(), Entry { value, inserted_at: Instant::now(), ttl });
        inner.order.push_front(key);
        Self::evict_if_needed(&mut inner, self.max_size, &self.on_evict);
    }

    fn evict_if_needed(inner: &mut Inner<K, V>, max_size: usize, on_evict: &Option<Box<dyn Fn(&K, &V) + Send + Sync>>) {
        if max_size == 0 {
            return;
        }
        while inner.map.len() > max_size {
            let Some(candidate) = inner.order.pop_back() else { break };
            // The order deque may hold stale duplicates; only evict keys
            // still present in the map, and only once per live entry.
            if let Some(entry) = inner.map.remove(&candidate) {
                if let Some(cb) = on_evict {
                    cb(&candidate, &entry.value);
                }
                inner.evictions += 1;
            }
        }
    }

    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute();
        self.set(key, value.clone());
        value
    }

    pub async fn get_or_compute_async<F, Fut>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = V>,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute().await;
        self.set(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.map.clear();
        inner.order.clear();
    }

    pub fn hits(&self) -> u64 {
        self.inner.lock().unwrap().hits
    }

    pub fn misses(&self) -> u64 {
        self.inner.lock().unwrap().misses
    }

    pub fn evictions(&self) -> u64 {
        self.inner.lock().unwrap().evictions
    }

    pub fn hit_rate(&self) -> f64 {
        let inner = self.inner.lock().unwrap();
        let total = inner.hits + inner.misses;
        if total == 0 {
            0.0
        } else {
            inner.hits as f64 / total as f64
        }
    }
}
