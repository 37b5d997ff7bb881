use std::sync::Arc;

use reqwest::{Method, StatusCode};
use tracing::{debug, error, warn};

use crate::cache::{CachePartition, RequestKey};
use crate::error::InterceptError;
use crate::http::{Request, Response, ResponseType};
use crate::interceptor::Interceptor;

/// How a request is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Not intercepted; default network handling applies
    Passthrough,
    /// Same-origin: static partition first, network fallback
    StaticFirst,
    /// Whitelisted external origin: dynamic partition first, network fallback
    DynamicFirst,
}

/// Result of handling a fetch signal
#[derive(Debug)]
pub enum FetchOutcome {
    /// The request was not intercepted and is handed back untouched
    Passthrough(Request),
    /// The interceptor answered the request
    Respond(Response),
}

impl FetchOutcome {
    pub fn is_passthrough(&self) -> bool {
        matches!(self, FetchOutcome::Passthrough(_))
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            FetchOutcome::Respond(response) => Some(response),
            FetchOutcome::Passthrough(_) => None,
        }
    }
}

/// Whether a same-origin network response may be stored
fn is_shell_cacheable(response: &Response) -> bool {
    response.status == StatusCode::OK
        && response.response_type == ResponseType::Basic
        && !response.redirected
}

impl Interceptor {
    /// Decide how `request` is handled
    pub fn route(&self, request: &Request) -> Route {
        if request.method != Method::GET {
            return Route::Passthrough;
        }

        if self.config.is_same_origin(&request.url) {
            Route::StaticFirst
        } else if self.config.origin_whitelist().matches(&request.url) {
            Route::DynamicFirst
        } else {
            Route::Passthrough
        }
    }

    /// Handle the fetch signal for one request
    pub async fn handle_fetch(&self, request: Request) -> Result<FetchOutcome, InterceptError> {
        match self.route(&request) {
            Route::Passthrough => Ok(FetchOutcome::Passthrough(request)),
            Route::StaticFirst => self.static_first(request).await.map(FetchOutcome::Respond),
            Route::DynamicFirst => self.dynamic_first(request).await.map(FetchOutcome::Respond),
        }
    }

    /// Cache-first with network fallback for same-origin requests.
    ///
    /// Cached entries are served without revalidation. Network responses
    /// that are 200, basic and not redirected are stored in the background
    /// after being handed to the caller. A failed navigation falls back to
    /// the cached offline shell.
    pub async fn static_first(&self, request: Request) -> Result<Response, InterceptError> {
        let key = RequestKey::from_request(&request);
        let partition = self.storage.open(self.config.static_partition()).await?;

        if let Some(cached) = partition.match_key(&key).await? {
            debug!(url = %key.url(), "Serving from cache");
            return Ok(cached);
        }

        let is_navigation = request.is_navigation();
        match self.network.fetch(request).await {
            Ok(response) => {
                if !is_shell_cacheable(&response) {
                    return Ok(response);
                }

                let (response, copy) = response.duplicate();
                self.store_in_background(partition, key, copy);
                Ok(response)
            }
            Err(e) => {
                error!(url = %key.url(), error = %e, "Fetch failed");
                if is_navigation {
                    return self.offline_shell(&*partition).await;
                }
                Err(e.into())
            }
        }
    }

    /// Cache-first with network fallback for whitelisted external origins.
    ///
    /// Any 200 response is stored, regardless of its type, before it is
    /// returned. Network failures are always propagated.
    pub async fn dynamic_first(&self, request: Request) -> Result<Response, InterceptError> {
        let key = RequestKey::from_request(&request);
        let partition = self.storage.open(self.config.dynamic_partition()).await?;

        if let Some(cached) = partition.match_key(&key).await? {
            debug!(url = %key.url(), "Serving external resource from cache");
            return Ok(cached);
        }

        let response = self.network.fetch(request).await.map_err(|e| {
            error!(url = %key.url(), error = %e, "External resource fetch failed");
            e
        })?;

        if response.status != StatusCode::OK {
            return Ok(response);
        }

        let (response, copy) = response.duplicate();
        if let Err(e) = partition.put(key.clone(), copy).await {
            warn!(url = %key.url(), error = %e, "Failed to cache external resource");
        }
        Ok(response)
    }

    async fn offline_shell(&self, partition: &dyn CachePartition) -> Result<Response, InterceptError> {
        let shell = self.config.offline_shell();
        match partition.match_key(&RequestKey::get(shell.clone())).await? {
            Some(response) => {
                debug!(url = %shell, "Serving offline shell");
                Ok(response)
            }
            None => Err(InterceptError::OfflineShellMissing(shell.clone())),
        }
    }

    fn store_in_background(&self, partition: Arc<dyn CachePartition>, key: RequestKey, response: Response) {
        self.background.spawn(async move {
            if let Err(e) = partition.put(key.clone(), response).await {
                warn!(cache = %partition.name(), url = %key.url(), error = %e, "Background cache write failed");
            }
        });
    }
}
