use reqwest::Proxy;
use serde::Deserialize;

use crate::error::NetworkError;

/// Proxy configuration types
#[derive(Debug, Clone, PartialEq, Eq, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    /// HTTP proxy
    Http,
    /// HTTPS proxy
    Https,
    /// SOCKS5 proxy
    Socks5,
    /// All protocols proxy
    All,
}

/// Proxy authentication
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

/// Proxy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Proxy server URL (e.g., "http://proxy.example.com:8080")
    pub url: String,
    pub proxy_type: ProxyType,
    pub auth: Option<ProxyAuth>,
}

/// Build a reqwest Proxy object from our proxy configuration
pub fn build_proxy_from_config(config: &ProxyConfig) -> Result<Proxy, NetworkError> {
    let proxy_url = &config.url;
    let invalid = |kind: &str, e: reqwest::Error| {
        NetworkError::Unreachable(format!("Invalid {kind} proxy URL {proxy_url}: {e}"))
    };

    let mut proxy = match config.proxy_type {
        ProxyType::Http => Proxy::http(proxy_url).map_err(|e| invalid("HTTP", e))?,
        ProxyType::Https => Proxy::https(proxy_url).map_err(|e| invalid("HTTPS", e))?,
        ProxyType::Socks5 => {
            let url = if proxy_url.starts_with("socks5://") {
                proxy_url.to_string()
            } else {
                format!("socks5://{proxy_url}")
            };

            Proxy::all(&url).map_err(|e| invalid("SOCKS5", e))?
        }
        ProxyType::All => Proxy::all(proxy_url).map_err(|e| invalid("generic", e))?,
    };

    if let Some(auth) = &config.auth {
        proxy = proxy.basic_auth(&auth.username, &auth.password);
    }

    Ok(proxy)
}
