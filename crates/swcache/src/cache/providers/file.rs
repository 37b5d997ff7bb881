//! # File Cache
//!
//! This module implements a durable, file-based cache storage.
//!
//! Layout: `<root>/<hex(partition name)>/<sha256(method:url)>` holds the body
//! and a sibling `.meta` file holds the JSON [`EntryMetadata`].
//!
//! Each write goes through its own uniquely named temp files and is renamed
//! into place. Reads, writes and deletes of one entry are serialized by a
//! per-entry lock shared by every partition handle of a [`FileCacheStorage`],
//! so a reader never pairs one writer's body with another's metadata.
//! Separate storages over the same root do not share these locks.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::fs;
use tokio::io;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::task;
use tracing::{debug, warn};

use crate::cache::providers::{CachePartition, CacheStorage};
use crate::cache::types::{CacheResult, EntryMetadata, RequestKey};
use crate::error::CacheError;
use crate::http::Response;

const META_EXTENSION: &str = "meta";
const TEMP_SUFFIX: &str = ".tmp";

/// Durable cache storage rooted at a directory
#[derive(Debug, Clone)]
pub struct FileCacheStorage {
    root: PathBuf,
    locks: Arc<EntryLocks>,
}

impl FileCacheStorage {
    /// Create a storage rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Arc::new(EntryLocks::default()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn partition_dir(&self, name: &str) -> PathBuf {
        self.root.join(hex::encode(name.as_bytes()))
    }
}

/// Async locks keyed by entry path, dropped once nobody holds or awaits them
#[derive(Debug, Default)]
struct EntryLocks {
    held: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl EntryLocks {
    async fn acquire(&self, path: &Path) -> EntryGuard<'_> {
        let lock = self.held.lock().entry(path.to_path_buf()).or_default().clone();
        let guard = lock.lock_owned().await;
        EntryGuard {
            locks: self,
            path: path.to_path_buf(),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.held.lock().len()
    }
}

struct EntryGuard<'a> {
    locks: &'a EntryLocks,
    path: PathBuf,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        let mut held = self.locks.held.lock();
        self.guard.take();
        if held
            .get(&self.path)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            held.remove(&self.path);
        }
    }
}

/// Write `contents` to a fresh temp file in `dir` and rename it onto `path`.
/// The temp file is removed on failure.
fn persist(dir: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut temp = tempfile::Builder::new().suffix(TEMP_SUFFIX).tempfile_in(dir)?;
    temp.write_all(contents)?;
    temp.persist(path)?;
    Ok(())
}

/// Store body then metadata. A body left without its metadata is removed.
fn write_entry(
    dir: &Path,
    data_path: &Path,
    body: &[u8],
    meta_path: &Path,
    metadata: &[u8],
) -> std::io::Result<()> {
    if let Err(e) = persist(dir, data_path, body) {
        warn!(path = ?data_path, error = %e, "Failed to write cache data file");
        return Err(e);
    }

    if let Err(e) = persist(dir, meta_path, metadata) {
        warn!(path = ?meta_path, error = %e, "Failed to write cache metadata file");
        let _ = std::fs::remove_file(data_path);
        return Err(e);
    }

    Ok(())
}

#[async_trait]
impl CacheStorage for FileCacheStorage {
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CachePartition>> {
        let dir = self.partition_dir(name);
        fs::create_dir_all(&dir).await?;
        Ok(Arc::new(FilePartition {
            name: name.to_string(),
            dir,
            locks: self.locks.clone(),
        }))
    }

    async fn has(&self, name: &str) -> CacheResult<bool> {
        Ok(fs::try_exists(self.partition_dir(name)).await?)
    }

    async fn delete(&self, name: &str) -> CacheResult<bool> {
        let dir = self.partition_dir(name);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!(cache = %name, path = ?dir, "Deleted cache partition directory");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                warn!(cache = %name, path = ?dir, error = %e, "Failed to delete cache partition");
                Err(e.into())
            }
        }
    }

    async fn keys(&self) -> CacheResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }

            let dir_name = entry.file_name();
            let decoded = dir_name
                .to_str()
                .and_then(|s| hex::decode(s).ok())
                .and_then(|bytes| String::from_utf8(bytes).ok());

            match decoded {
                Some(name) => names.push(name),
                None => debug!(path = ?entry.path(), "Skipping foreign directory in cache root"),
            }
        }

        names.sort();
        Ok(names)
    }
}

/// A partition backed by one directory
#[derive(Debug)]
pub struct FilePartition {
    name: String,
    dir: PathBuf,
    locks: Arc<EntryLocks>,
}

impl FilePartition {
    fn data_path(&self, key: &RequestKey) -> PathBuf {
        self.dir.join(key.to_filename())
    }

    fn meta_path(&self, key: &RequestKey) -> PathBuf {
        let mut path = self.data_path(key);
        path.set_extension(META_EXTENSION);
        path
    }

    async fn read_metadata(path: &Path) -> CacheResult<Option<EntryMetadata>> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to parse cache metadata");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl CachePartition for FilePartition {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_key(&self, key: &RequestKey) -> CacheResult<Option<Response>> {
        if !key.is_storable() {
            return Ok(None);
        }

        let data_path = self.data_path(key);
        let _entry = self.locks.acquire(&data_path).await;

        let Some(metadata) = Self::read_metadata(&self.meta_path(key)).await? else {
            return Ok(None);
        };

        let data = match fs::read(&data_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = ?data_path, "Cache metadata without body, treating as miss");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let head = match metadata.head() {
            Ok(head) => head,
            Err(CacheError::InvalidEntry(reason)) => {
                warn!(path = ?data_path, reason = %reason, "Invalid cache metadata, treating as miss");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        Ok(Some(Response::from_parts(head, Bytes::from(data))))
    }

    async fn put(&self, key: RequestKey, response: Response) -> CacheResult<()> {
        key.ensure_storable()?;

        let data_path = self.data_path(&key);
        let meta_path = self.meta_path(&key);

        // A partition deleted by a concurrent activation comes back on write.
        fs::create_dir_all(&self.dir).await?;

        let (head, body) = response.into_parts();
        let metadata = EntryMetadata::new(&key, &head, body.len() as u64);
        let metadata_json = serde_json::to_vec(&metadata)?;

        let _entry = self.locks.acquire(&data_path).await;
        let dir = self.dir.clone();
        task::spawn_blocking(move || write_entry(&dir, &data_path, &body, &meta_path, &metadata_json))
            .await
            .map_err(std::io::Error::other)??;

        debug!(cache = %self.name, key = %key, "Successfully cached entry to file");
        Ok(())
    }

    async fn delete(&self, key: &RequestKey) -> CacheResult<bool> {
        let data_path = self.data_path(key);
        let _entry = self.locks.acquire(&data_path).await;

        let meta_result = fs::remove_file(self.meta_path(key)).await;
        let data_result = fs::remove_file(&data_path).await;

        match (meta_result, data_result) {
            (Ok(()), _) => Ok(true),
            (Err(e), _) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            (_, Err(e)) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(false),
        }
    }

    async fn keys(&self) -> CacheResult<Vec<RequestKey>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(META_EXTENSION) {
                continue;
            }

            if let Some(metadata) = Self::read_metadata(&path).await? {
                match metadata.key() {
                    Ok(key) => keys.push(key),
                    Err(CacheError::InvalidEntry(reason)) => {
                        warn!(path = ?path, reason = %reason, "Skipping invalid cache entry")
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(keys)
    }
}
