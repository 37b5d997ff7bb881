//! # Cache Interceptor
//!
//! Reacts to lifecycle signals from the host: `install` fills the static
//! partition, `activate` drops partitions from other versions, and `fetch`
//! decides between cache and network for every intercepted request.
//!
//! The interceptor keeps no state of its own beyond handles to the injected
//! storage, network and host. Opportunistic cache fills run on a
//! [`TaskTracker`]; hosts that recycle the execution context may drop them,
//! so nothing depends on their completion.

mod fetch;
mod lifecycle;

use std::sync::Arc;

use tokio_util::task::TaskTracker;

use crate::cache::CacheStorage;
use crate::config::InterceptorConfig;
use crate::host::Host;
use crate::network::Network;

pub use fetch::{FetchOutcome, Route};

/// The cache interceptor for one application version
#[derive(Clone)]
pub struct Interceptor {
    config: Arc<InterceptorConfig>,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    host: Arc<dyn Host>,
    background: TaskTracker,
}

impl Interceptor {
    pub fn new(
        config: InterceptorConfig,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        host: Arc<dyn Host>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            network,
            host,
            background: TaskTracker::new(),
        }
    }

    pub fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    pub(crate) fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// Cache writes started after a response was already delivered
    pub fn background_tasks(&self) -> &TaskTracker {
        &self.background
    }

    /// Wait for every pending background write to finish
    pub async fn flush_background(&self) {
        self.background.close();
        self.background.wait().await;
        self.background.reopen();
    }
}
