use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use rustls::{ClientConfig, crypto::aws_lc_rs};
use rustls_platform_verifier::BuilderVerifierExt;
use tracing::{debug, info};
use url::{Origin, Url};

use crate::error::NetworkError;
use crate::http::{Request, Response, ResponseType};
use crate::network::Network;
use crate::network::config::NetworkConfig;
use crate::network::proxy::build_proxy_from_config;

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &NetworkConfig) -> Result<Client, NetworkError> {
    let provider = Arc::new(aws_lc_rs::default_provider());

    let tls_error = |e: rustls::Error| NetworkError::Unreachable(format!("TLS setup failed: {e}"));
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(tls_error)?
        .with_platform_verifier()
        .map_err(tls_error)?
        .with_no_client_auth();

    let mut client_builder = Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(config.headers.clone())
        .use_preconfigured_tls(tls_config)
        .redirect(if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        });

    if !config.timeout.is_zero() {
        client_builder = client_builder.timeout(config.timeout);
    }

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    if !config.pool_idle_timeout.is_zero() {
        client_builder = client_builder.pool_idle_timeout(config.pool_idle_timeout);
    }

    if let Some(proxy_config) = &config.proxy {
        let proxy = build_proxy_from_config(proxy_config)?;
        client_builder = client_builder.proxy(proxy);
        info!(proxy_url = %proxy_config.url, "Using explicitly configured proxy");
    } else if config.use_system_proxy {
        // Environment variables and, with `system-proxy`, the OS proxy configuration
        debug!("Using system proxy settings");
    } else {
        client_builder = client_builder.no_proxy();
        debug!("Proxy disabled");
    }

    client_builder.build().map_err(NetworkError::from)
}

/// [`Network`] implementation over a reqwest client.
///
/// Responses whose final URL shares the application's origin are classified
/// as [`ResponseType::Basic`], everything else as [`ResponseType::Cors`].
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: Client,
    origin: Origin,
}

impl HttpNetwork {
    /// Create a network for the application served from `scope`
    pub fn new(scope: &Url, config: &NetworkConfig) -> Result<Self, NetworkError> {
        Ok(Self::with_client(scope, create_client(config)?))
    }

    pub fn with_client(scope: &Url, client: Client) -> Self {
        Self {
            client,
            origin: scope.origin(),
        }
    }
}

fn classify(origin: &Origin, final_url: &Url) -> ResponseType {
    if final_url.origin() == *origin {
        ResponseType::Basic
    } else {
        ResponseType::Cors
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: Request) -> Result<Response, NetworkError> {
        let mut requested = request.url.clone();
        requested.set_fragment(None);

        let response = self
            .client
            .request(request.method, requested.clone())
            .headers(request.headers)
            .send()
            .await
            .map_err(NetworkError::from_reqwest)?;

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let redirected = final_url != requested;
        let response_type = classify(&self.origin, &final_url);
        let body = response.bytes().await.map_err(NetworkError::from_reqwest)?;

        debug!(
            url = %requested,
            status = %status,
            response_type = %response_type,
            redirected,
            size = body.len(),
            "Network response received"
        );

        Ok(Response::new(status, body)
            .with_headers(headers)
            .with_type(response_type)
            .with_url(final_url)
            .with_redirected(redirected))
    }
}
