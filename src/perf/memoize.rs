//! Wraps a pure function with an LRU cache (spec.md §4.I).

use std::hash::Hash;

use super::lru::LruCache;

pub struct Memoized<A, R, F> {
    f: F,
    pub cache: LruCache<A, R>,
}

impl<A, R, F> Memoized<A, R, F>
where
    A: Eq + Hash + Clone,
    R: Clone,
    F: Fn(&A) -> R,
{
    pub fn new(f: F, max_size: usize) -> Self {
        Self { f, cache: LruCache::new(max_size) }
    }

    pub fn call(&self, arg: A) -> R {
        if let Some(cached) = self.cache.get(&arg) {
            return cached;
        }
        let result = (self.f)(&arg);
        self.cache.set(arg, result.clone());
        result
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}
