use futures::future::{join_all, try_join_all};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::cache::RequestKey;
use crate::error::InterceptError;
use crate::http::{Request, Response};
use crate::interceptor::Interceptor;

impl Interceptor {
    /// Handle the install signal.
    ///
    /// Fetches every manifest asset and stores them in the static partition.
    /// Any failed or non-2xx asset fails the whole install before anything
    /// is written. A failed write discards the static partition. Either way
    /// the host is expected to retry. On success the host is asked to
    /// activate this version without waiting.
    pub async fn install(&self) -> Result<(), InterceptError> {
        info!(version = %self.config.version(), "Installing");

        match self.precache().await {
            Ok(count) => {
                info!(cache = %self.config.static_partition(), count, "Static assets cached successfully");
                self.host.skip_waiting().await;
                Ok(())
            }
            Err(e) => {
                error!(cache = %self.config.static_partition(), error = %e, "Failed to cache static assets");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, InterceptError> {
        let partition = self.storage.open(self.config.static_partition()).await?;
        debug!(cache = %partition.name(), "Caching static assets");

        let fetches = self
            .config
            .asset_manifest()
            .iter()
            .map(|url| self.fetch_asset(url));
        let responses = try_join_all(fetches).await?;

        let count = responses.len();
        let written = try_join_all(
            responses
                .into_iter()
                .map(|(key, response)| partition.put(key, response)),
        )
        .await;

        if let Err(e) = written {
            warn!(cache = %partition.name(), error = %e, "Discarding partially written static cache");
            if let Err(delete_error) = self.storage.delete(partition.name()).await {
                warn!(cache = %partition.name(), error = %delete_error, "Failed to discard static cache");
            }
            return Err(e.into());
        }

        Ok(count)
    }

    async fn fetch_asset(&self, url: &Url) -> Result<(RequestKey, Response), InterceptError> {
        let response = self.network.fetch(Request::get(url.clone())).await?;
        if !response.ok() {
            return Err(InterceptError::AssetRejected {
                url: url.clone(),
                status: response.status,
            });
        }
        Ok((RequestKey::get(url.clone()), response))
    }

    /// Handle the activate signal.
    ///
    /// Deletes every partition that is neither this version's static nor
    /// dynamic partition, then claims all open clients. Individual deletion
    /// failures are logged and otherwise ignored.
    pub async fn activate(&self) -> Result<(), InterceptError> {
        info!(version = %self.config.version(), "Activating");

        let partitions = self.config.partitions();
        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| !partitions.is_current(name))
            .collect();

        let deletions = stale.iter().map(|name| async move {
            info!(cache = %name, "Deleting old cache");
            if let Err(e) = self.storage.delete(name).await {
                warn!(cache = %name, error = %e, "Failed to delete old cache");
            }
        });
        join_all(deletions).await;

        self.host.claim_clients().await;
        info!(removed = stale.len(), "Activated successfully");
        Ok(())
    }
}
