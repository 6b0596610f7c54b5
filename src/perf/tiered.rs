//! Two-level cache: a small hot L1 in front of a larger warm L2. L2 hits are
//! promoted into L1 (spec.md §4.I).

use std::hash::Hash;

use super::lru::LruCache;

pub struct TieredCache<K, V> {
    l1: LruCache<K, V>,
    l2: LruCache<K, V>,
}

impl<K, V> TieredCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(l1_size: usize, l2_size: usize) -> Self {
        Self { l1: LruCache::new(l1_size), l2: LruCache::new(l2_size) }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        if let Some(value) = self.l1.get(key) {
            return Some(value);
        }
        let promoted = self.l2.get(key)?;
        self.l1.set(key.clone(), promoted.clone());
        Some(promoted)
    }

    /// Fresh values enter L1 directly; L2 only fills via promotion or an
    /// explicit `set_cold`.
    pub fn set(&self, key: K, value: V) {
        self.l1.set(key, value);
    }

    pub fn set_cold(&self, key: K, value: V) {
        self.l2.set(key, value);
    }

    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute();
        self.set(key, value.clone());
        value
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.l1.hits() + self.l2.hits();
        let misses_on_l1_that_also_miss_l2 = self.l2.misses();
        let total = hits + misses_on_l1_that_also_miss_l2;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_hit_promotes_into_l1() {
        let cache: TieredCache<&str, u32> = TieredCache::new(1, 4);
        cache.set_cold("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        // Now resident in L1 too: evicting L1's only slot should not remove it from L2.
        cache.set("b", 2);
        assert_eq!(cache.get(&"a"), Some(1));
    }

    #[test]
    fn fresh_set_lands_in_l1() {
        let cache: TieredCache<&str, u32> = TieredCache::new(4, 4);
        cache.set("a", 1);
        assert_eq!(cache.l1.get(&"a"), Some(1));
    }
}
