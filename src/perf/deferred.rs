//! A value loaded once, on first access, with concurrent-request dedup via
//! a single lock held across the load (spec.md §4.I).

use std::sync::Mutex;

enum State<T> {
    Empty,
    Loaded(T),
}

pub struct Deferred<T, F>
where
    F: Fn() -> T,
{
    loader: F,
    state: Mutex<State<T>>,
}

impl<T, F> Deferred<T, F>
where
    T: Clone,
    F: Fn() -> T,
{
    pub fn new(loader: F) -> Self {
        Self { loader, state: Mutex::new(State::Empty) }
    }

    /// Loads on first call; concurrent callers block on the same lock and
    /// observe the same cached value rather than each triggering a load.
    pub fn get(&self) -> T {
        let mut state = self.state.lock().unwrap();
        if let State::Loaded(value) = &*state {
            return value.clone();
        }
        let value = (self.loader)();
        *state = State::Loaded(value.clone());
        value
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.lock().unwrap(), State::Loaded(_))
    }

    pub fn reset(&self) {
        *self.state.lock().unwrap() = State::Empty;
    }
}
