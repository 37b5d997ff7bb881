//! # Memory Cache Provider
//!
//! In-process partitions guarded by `parking_lot` locks. Nothing survives a
//! restart; used by tests and by hosts without durable storage.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tracing::debug;

use crate::cache::providers::{CachePartition, CacheStorage};
use crate::cache::types::{CacheResult, RequestKey};
use crate::http::{Response, ResponseHead};

/// Entry in a memory partition
#[derive(Clone)]
struct CacheEntry {
    head: ResponseHead,
    body: Bytes,
}

/// A single in-memory partition
pub struct MemoryPartition {
    name: String,
    entries: RwLock<HashMap<RequestKey, CacheEntry>>,
}

impl MemoryPartition {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CachePartition for MemoryPartition {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_key(&self, key: &RequestKey) -> CacheResult<Option<Response>> {
        if !key.is_storable() {
            return Ok(None);
        }

        let entry = self.entries.read().get(key).cloned();
        Ok(entry.map(|entry| Response::from_parts(entry.head, entry.body)))
    }

    async fn put(&self, key: RequestKey, response: Response) -> CacheResult<()> {
        key.ensure_storable()?;

        let (head, body) = response.into_parts();
        debug!(cache = %self.name, key = %key, size = body.len(), "Stored entry in memory partition");
        self.entries.write().insert(key, CacheEntry { head, body });
        Ok(())
    }

    async fn delete(&self, key: &RequestKey) -> CacheResult<bool> {
        Ok(self.entries.write().remove(key).is_some())
    }

    async fn keys(&self) -> CacheResult<Vec<RequestKey>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

/// Registry of in-memory partitions, listed in name order
#[derive(Default, Clone)]
pub struct MemoryCacheStorage {
    partitions: Arc<RwLock<BTreeMap<String, Arc<MemoryPartition>>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access to a partition without creating it
    pub fn partition(&self, name: &str) -> Option<Arc<MemoryPartition>> {
        self.partitions.read().get(name).cloned()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CachePartition>> {
        let partition: Arc<MemoryPartition> = self
            .partitions
            .write()
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(cache = %name, "Created memory partition");
                Arc::new(MemoryPartition::new(name))
            })
            .clone();
        Ok(partition as Arc<dyn CachePartition>)
    }

    async fn has(&self, name: &str) -> CacheResult<bool> {
        Ok(self.partitions.read().contains_key(name))
    }

    async fn delete(&self, name: &str) -> CacheResult<bool> {
        let removed = self.partitions.write().remove(name).is_some();
        if removed {
            debug!(cache = %name, "Deleted memory partition");
        }
        Ok(removed)
    }

    async fn keys(&self) -> CacheResult<Vec<String>> {
        Ok(self.partitions.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::http::ResponseType;
    use reqwest::{Method, StatusCode};
    use url::Url;

    fn key(path: &str) -> RequestKey {
        RequestKey::get(Url::parse("https://app.example/").unwrap().join(path).unwrap())
    }

    #[tokio::test]
    async fn test_open_creates_once() {
        let storage = MemoryCacheStorage::new();
        assert!(!storage.has("static-v1").await.unwrap());

        let first = storage.open("static-v1").await.unwrap();
        first.put(key("a"), Response::basic("a")).await.unwrap();

        let second = storage.open("static-v1").await.unwrap();
        assert!(second.match_key(&key("a")).await.unwrap().is_some());
        assert_eq!(storage.keys().await.unwrap(), vec!["static-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_match_returns_fresh_copy_each_time() {
        let storage = MemoryCacheStorage::new();
        let partition = storage.open("static-v1").await.unwrap();
        partition
            .put(key("index.html"), Response::basic("<html>shell</html>"))
            .await
            .unwrap();

        for _ in 0..2 {
            let hit = partition.match_key(&key("index.html")).await.unwrap().unwrap();
            assert_eq!(hit.status, StatusCode::OK);
            assert_eq!(hit.response_type, ResponseType::Basic);
            assert_eq!(hit.bytes(), Bytes::from_static(b"<html>shell</html>"));
        }
    }

    #[tokio::test]
    async fn test_put_replaces_entry() {
        let storage = MemoryCacheStorage::new();
        let partition = storage.open("dynamic-v1").await.unwrap();
        partition.put(key("x"), Response::basic("old")).await.unwrap();
        partition.put(key("x"), Response::basic("new")).await.unwrap();

        assert_eq!(partition.keys().await.unwrap().len(), 1);
        let hit = partition.match_key(&key("x")).await.unwrap().unwrap();
        assert_eq!(hit.bytes(), Bytes::from_static(b"new"));
    }

    #[tokio::test]
    async fn test_put_rejects_non_get() {
        let storage = MemoryCacheStorage::new();
        let partition = storage.open("static-v1").await.unwrap();
        let post = RequestKey::new(Method::POST, Url::parse("https://app.example/api").unwrap());

        let result = partition.put(post.clone(), Response::basic("x")).await;
        assert!(matches!(result, Err(CacheError::UnsupportedMethod(_))));
        assert!(partition.match_key(&post).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_partition_and_entry() {
        let storage = MemoryCacheStorage::new();
        let partition = storage.open("old-v0").await.unwrap();
        partition.put(key("a"), Response::basic("a")).await.unwrap();

        assert!(partition.delete(&key("a")).await.unwrap());
        assert!(!partition.delete(&key("a")).await.unwrap());

        assert!(storage.delete("old-v0").await.unwrap());
        assert!(!storage.delete("old-v0").await.unwrap());
        assert!(storage.keys().await.unwrap().is_empty());
    }
}
