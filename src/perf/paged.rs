//! Lazily-loaded paged collection (spec.md §4.I): a loader fetches one page
//! at a time; `count()` is cached on first call.

use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

pub struct PagedCollection<T, L, C>
where
    L: Fn(usize, usize) -> Vec<T>,
    C: Fn() -> usize,
{
    loader: L,
    counter: C,
    page_size: usize,
    cached_count: Mutex<Option<usize>>,
}

impl<T, L, C> PagedCollection<T, L, C>
where
    L: Fn(usize, usize) -> Vec<T>,
    C: Fn() -> usize,
{
    pub fn new(page_size: usize, loader: L, counter: C) -> Self {
        Self { loader, counter, page_size, cached_count: Mutex::new(None) }
    }

    pub fn count(&self) -> usize {
        let mut cached = self.cached_count.lock().unwrap();
        if let Some(count) = *cached {
            return count;
        }
        let count = (self.counter)();
        *cached = Some(count);
        count
    }

    fn total_pages(&self) -> usize {
        let count = self.count();
        if self.page_size == 0 {
            0
        } else {
            count.div_ceil(self.page_size)
        }
    }

    /// Direct index access, reusing the page containing `index`.
    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        if index >= self.count() {
            return None;
        }
        let page_number = index / self.page_size;
        let offset_in_page = index % self.page_size;
        let items = (self.loader)(page_number * self.page_size, self.page_size);
        items.into_iter().nth(offset_in_page)
    }

    pub fn page(&self, page_number: usize) -> Page<T> {
        let total_items = self.count();
        let total_pages = self.total_pages();
        let items = (self.loader)(page_number * self.page_size, self.page_size);
        Page {
            items,
            page: page_number,
            page_size: self.page_size,
            total_items,
            total_pages,
            has_next: page_number + 1 < total_pages,
            has_prev: page_number > 0,
        }
    }

    pub fn iter(&self) -> PagedIter<'_, T, L, C> {
        PagedIter { collection: self, index: 0 }
    }

    pub fn find<P>(&self, predicate: P) -> Option<T>
    where
        T: Clone,
        P: Fn(&T) -> bool,
    {
        self.iter().find(|item| predicate(item))
    }

    pub fn filter<P>(&self, predicate: P) -> Vec<T>
    where
        T: Clone,
        P: Fn(&T) -> bool,
    {
        self.iter().filter(predicate).collect()
    }

    pub fn map<R>(&self, f: impl Fn(T) -> R) -> Vec<R>
    where
        T: Clone,
    {
        self.iter().map(f).collect()
    }

    /// Takes up to `n` items, optionally restricted to ones matching `predicate`.
    pub fn take(&self, n: usize, predicate: Option<&dyn Fn(&T) -> bool>) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::with_capacity(n);
        for item in self.iter() {
            let matches = match predicate {
                None => true,
                Some(f) => f(&item),
            };
            if matches {
                out.push(item);
                if out.len() == n {
                    break;
                }
            }
        }
        out
    }
}

pub struct PagedIter<'a, T, L, C>
where
    L: Fn(usize, usize) -> Vec<T>,
    C: Fn() -> usize,
{
    collection: &'a PagedCollection<T, L, C>,
    index: usize,
}

impl<'a, T, L, C> Iterator for PagedIter<'a, T, L, C>
where
    T: Clone,
    L: Fn(usize, usize) -> Vec<T>,
    C: Fn() -> usize,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.collection.get(self.index)?;
        self.index += 1;
        Some(item)
    }
}
