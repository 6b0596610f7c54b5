//! Performance utilities (component I, spec.md §4.I): caching and batching
//! primitives shared by the workspace and narrative layers.

pub mod batch;
pub mod deferred;
pub mod lru;
pub mod memoize;
pub mod paged;
pub mod stream;
pub mod tiered;

pub use batch::BatchLoader;
pub use deferred::Deferred;
pub use lru::LruCache;
pub use memoize::Memoized;
pub use paged::{Page, PagedCollection};
pub use stream::StreamProcessor;
pub use tiered::TieredCache;
