//! # Cache Providers
//!
//! This module contains the storage trait and its implementations.

pub use self::file::{FileCacheStorage, FilePartition};
pub use self::memory::{MemoryCacheStorage, MemoryPartition};
pub use self::provider::{CachePartition, CacheStorage};

// Provider interface
pub mod provider;

// Individual provider implementations
pub mod file;
pub mod memory;
