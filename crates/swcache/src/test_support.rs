//! Scripted network and recording host shared by the unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::StatusCode;
use url::Url;

use crate::cache::MemoryCacheStorage;
use crate::config::InterceptorConfig;
use crate::error::NetworkError;
use crate::events::NotificationOptions;
use crate::host::Host;
use crate::http::{Request, Response, ResponseType};
use crate::interceptor::Interceptor;
use crate::network::Network;

pub const SCOPE: &str = "https://app.example/ephone/";

#[inline]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[derive(Clone)]
struct Scripted {
    status: StatusCode,
    response_type: ResponseType,
    redirected: bool,
    body: Bytes,
}

/// Network that answers from a script and records every call
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<Url>>,
    offline: AtomicBool,
}

impl FakeNetwork {
    pub fn serve(&self, url: &str, status: StatusCode, response_type: ResponseType, body: &'static str) {
        self.routes.lock().insert(
            url.to_string(),
            Scripted {
                status,
                response_type,
                redirected: false,
                body: Bytes::from_static(body.as_bytes()),
            },
        );
    }

    pub fn serve_basic(&self, url: &str, body: &'static str) {
        self.serve(url, StatusCode::OK, ResponseType::Basic, body);
    }

    pub fn serve_status(&self, url: &str, status: StatusCode) {
        self.serve(url, status, ResponseType::Basic, "");
    }

    pub fn serve_redirected(&self, url: &str, body: &'static str) {
        self.serve_basic(url, body);
        if let Some(route) = self.routes.lock().get_mut(url) {
            route.redirected = true;
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_for(&self, url: &Url) -> usize {
        self.calls.lock().iter().filter(|called| *called == url).count()
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: Request) -> Result<Response, NetworkError> {
        self.calls.lock().push(request.url.clone());

        if self.offline.load(Ordering::SeqCst) {
            return Err(NetworkError::Unreachable(format!("offline: {}", request.url)));
        }

        let scripted = self.routes.lock().get(request.url.as_str()).cloned();
        let response = match scripted {
            Some(route) => Response::new(route.status, route.body)
                .with_type(route.response_type)
                .with_redirected(route.redirected),
            None => Response::new(StatusCode::NOT_FOUND, Bytes::new()).with_type(ResponseType::Basic),
        };
        Ok(response.with_url(request.url))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    SkipWaiting,
    ClaimClients,
    ShowNotification { title: String, options: NotificationOptions },
    CloseNotification,
    OpenWindow(Url),
}

/// Host that records what it was asked to do
#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn skip_waiting(&self) {
        self.calls.lock().push(HostCall::SkipWaiting);
    }

    async fn claim_clients(&self) {
        self.calls.lock().push(HostCall::ClaimClients);
    }

    async fn show_notification(&self, title: &str, options: NotificationOptions) {
        self.calls.lock().push(HostCall::ShowNotification {
            title: title.to_string(),
            options,
        });
    }

    async fn close_notification(&self) {
        self.calls.lock().push(HostCall::CloseNotification);
    }

    async fn open_window(&self, url: Url) {
        self.calls.lock().push(HostCall::OpenWindow(url));
    }
}

/// An interceptor wired to in-memory fakes
pub struct Harness {
    pub interceptor: Interceptor,
    pub storage: Arc<MemoryCacheStorage>,
    pub network: Arc<FakeNetwork>,
    pub host: Arc<RecordingHost>,
}

impl Harness {
    pub fn new() -> Self {
        Self::from_config(Self::config("v1.3.0", None))
    }

    pub fn with_manifest(manifest: &[&str]) -> Self {
        Self::from_config(Self::config("v1.3.0", Some(manifest)))
    }

    fn config(version: &str, manifest: Option<&[&str]>) -> InterceptorConfig {
        let mut builder = InterceptorConfig::builder()
            .with_scope(SCOPE)
            .with_version(version);
        if let Some(manifest) = manifest {
            builder = builder.with_asset_manifest(manifest.iter().copied());
        }
        builder.build().unwrap()
    }

    fn from_config(config: InterceptorConfig) -> Self {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(FakeNetwork::default());
        let host = Arc::new(RecordingHost::default());
        Self::assemble(config, storage, network, host)
    }

    fn assemble(
        config: InterceptorConfig,
        storage: Arc<MemoryCacheStorage>,
        network: Arc<FakeNetwork>,
        host: Arc<RecordingHost>,
    ) -> Self {
        let interceptor = Interceptor::new(config, storage.clone(), network.clone(), host.clone());
        Self {
            interceptor,
            storage,
            network,
            host,
        }
    }

    /// A harness for another version sharing this one's storage, network and host
    pub fn next_version(&self, version: &str) -> Self {
        Self::assemble(
            Self::config(version, None),
            self.storage.clone(),
            self.network.clone(),
            self.host.clone(),
        )
    }

    /// Resolve `path` against the application scope
    pub fn url(&self, path: &str) -> Url {
        self.interceptor.config().scope().join(path).unwrap()
    }

    /// Serve every default manifest asset with a 200 response
    pub fn serve_manifest(&self) {
        self.network.serve_basic(SCOPE, "<html>root</html>");
        self.network
            .serve_basic("https://app.example/ephone/index.html", "<html>shell</html>");
        self.network
            .serve_basic("https://app.example/ephone/manifest.json", "{\"name\":\"EPhone\"}");
        self.network.serve(
            "https://i.postimg.cc/28p9L8FY/sogou20250606-073214826037-png.png",
            StatusCode::OK,
            ResponseType::Cors,
            "png",
        );
    }
}
