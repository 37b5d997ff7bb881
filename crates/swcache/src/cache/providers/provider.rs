//! # Cache Provider
//!
//! The traits every storage backend implements: a registry of named
//! partitions, and the partitions themselves.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::types::{CacheResult, RequestKey};
use crate::http::Response;

/// A registry of named cache partitions
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the partition called `name`, creating it if absent
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CachePartition>>;

    /// Check whether a partition called `name` exists
    async fn has(&self, name: &str) -> CacheResult<bool>;

    /// Delete a partition. Returns `false` if there was nothing to delete.
    async fn delete(&self, name: &str) -> CacheResult<bool>;

    /// Names of every existing partition
    async fn keys(&self) -> CacheResult<Vec<String>>;
}

/// A named mapping from request identity to stored response
#[async_trait]
pub trait CachePartition: Send + Sync {
    fn name(&self) -> &str;

    /// Look up a stored response. Every hit yields a fresh, readable copy.
    async fn match_key(&self, key: &RequestKey) -> CacheResult<Option<Response>>;

    /// Store a response, replacing any previous entry for the key
    async fn put(&self, key: RequestKey, response: Response) -> CacheResult<()>;

    /// Remove an entry. Returns `false` if it was not present.
    async fn delete(&self, key: &RequestKey) -> CacheResult<bool>;

    /// Keys of every stored entry
    async fn keys(&self) -> CacheResult<Vec<RequestKey>>;
}
