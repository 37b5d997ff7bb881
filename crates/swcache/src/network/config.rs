use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::network::proxy::ProxyConfig;

const DEFAULT_USER_AGENT: &str = concat!("swcache/", env!("CARGO_PKG_VERSION"));

/// Options for the HTTP client behind [`HttpNetwork`](super::HttpNetwork)
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Overall timeout for a request, zero disables it
    pub timeout: Duration,

    /// Connection timeout, zero disables it
    pub connect_timeout: Duration,

    /// How long idle pooled connections are kept
    pub pool_idle_timeout: Duration,

    pub follow_redirects: bool,

    pub user_agent: String,

    /// Headers sent with every request
    pub headers: HeaderMap,

    /// Explicit proxy, takes precedence over the system proxy
    pub proxy: Option<ProxyConfig>,

    /// Whether to honor `HTTP(S)_PROXY`/`NO_PROXY` and the OS proxy configuration
    pub use_system_proxy: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::ZERO,
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            follow_redirects: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers: NetworkConfig::get_default_headers(),
            proxy: None,
            use_system_proxy: true,
        }
    }
}

impl NetworkConfig {
    pub fn get_default_headers() -> HeaderMap {
        let mut default_headers = HeaderMap::new();

        default_headers.insert(
            reqwest::header::ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate"),
        );

        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("*/*"),
        );

        default_headers
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
