//! # Cache System
//!
//! Named, durable partitions of stored HTTP responses. Every partition is
//! reached through a [`CacheStorage`] handle so the interceptor can run
//! against the on-disk store or an in-memory one.

mod types;
pub mod providers;

pub use types::{CacheResult, EntryMetadata, RequestKey, StoredHeader};

pub use providers::{CachePartition, CacheStorage, FileCacheStorage, MemoryCacheStorage};
