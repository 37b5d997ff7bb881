//! # swcache
//!
//! A client-side caching interceptor for a single web application.
//!
//! ## Features
//!
//! - Versioned static partition filled at install, stale versions dropped at activation
//! - Cache-first handling of same-origin requests with an offline shell for navigations
//! - Cache-first handling of whitelisted external origins in a separate dynamic partition
//! - Injected storage, network and host so the logic runs anywhere
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use swcache_engine::{
//!     FileCacheStorage, HttpNetwork, Interceptor, InterceptorConfig, LoggingHost, NetworkConfig,
//!     Request,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = InterceptorConfig::builder()
//!     .with_scope("https://app.example/ephone/")
//!     .build()?;
//! let network = HttpNetwork::new(config.scope(), &NetworkConfig::default())?;
//! let interceptor = Interceptor::new(
//!     config,
//!     Arc::new(FileCacheStorage::new("/var/cache/ephone")),
//!     Arc::new(network),
//!     Arc::new(LoggingHost),
//! );
//!
//! interceptor.install().await?;
//! interceptor.activate().await?;
//!
//! let url = "https://app.example/ephone/index.html".parse()?;
//! let outcome = interceptor.handle_fetch(Request::navigate(url)).await?;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod http;
pub mod interceptor;
pub mod network;
pub mod whitelist;

#[cfg(test)]
mod test_support;

pub use builder::InterceptorConfigBuilder;
pub use cache::{CachePartition, CacheStorage, FileCacheStorage, MemoryCacheStorage, RequestKey};
pub use config::{InterceptorConfig, NotificationConfig, PartitionNames};
pub use error::{CacheError, InterceptError, NetworkError};
pub use events::{ClientMessage, EventOutcome, LifecycleEvent, NotificationOptions};
pub use host::{Host, LoggingHost};
pub use http::{Body, Destination, Request, Response, ResponseType};
pub use interceptor::{FetchOutcome, Interceptor, Route};
pub use network::{HttpNetwork, Network, NetworkConfig, ProxyAuth, ProxyConfig, ProxyType};
pub use whitelist::OriginWhitelist;
