//! # Cache Types
//!
//! This module defines common types used across the caching system.

use std::fmt;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CacheError;
use crate::http::{Request, ResponseHead, ResponseType};

/// Result of a cache operation
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Normalized identity of a cached request: method plus URL without fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    method: Method,
    url: Url,
}

impl RequestKey {
    /// Create a new key, dropping any URL fragment
    pub fn new(method: Method, mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method, url }
    }

    /// Key for a GET of `url`
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn from_request(request: &Request) -> Self {
        Self::new(request.method.clone(), request.url.clone())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Only read-only fetches may be stored
    pub fn is_storable(&self) -> bool {
        self.method == Method::GET
    }

    pub(crate) fn ensure_storable(&self) -> CacheResult<()> {
        if self.is_storable() {
            Ok(())
        } else {
            Err(CacheError::UnsupportedMethod(self.method.clone()))
        }
    }

    /// Convert to a filename-safe string
    pub fn to_filename(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(self.method.as_str());
        hasher.update(":");
        hasher.update(self.url.as_str());

        let hash = hasher.finalize();
        format!("{hash:x}")
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A response header as stored on disk. The value keeps its raw bytes,
/// which need not be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredHeader {
    pub name: String,
    #[serde(with = "hex::serde")]
    pub value: Vec<u8>,
}

/// Persisted description of a stored response, written next to its body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub method: String,
    pub request_url: Url,
    pub status: u16,
    pub headers: Vec<StoredHeader>,
    pub response_type: ResponseType,
    pub response_url: Option<Url>,
    pub redirected: bool,
    /// When the entry was stored (seconds since the epoch)
    pub cached_at: i64,
    pub size: u64,
}

impl EntryMetadata {
    pub(crate) fn new(key: &RequestKey, head: &ResponseHead, size: u64) -> Self {
        let headers = head
            .headers
            .iter()
            .map(|(name, value)| StoredHeader {
                name: name.as_str().to_string(),
                value: value.as_bytes().to_vec(),
            })
            .collect();

        Self {
            method: key.method.as_str().to_string(),
            request_url: key.url.clone(),
            status: head.status.as_u16(),
            headers,
            response_type: head.response_type,
            response_url: head.url.clone(),
            redirected: head.redirected,
            cached_at: chrono::Utc::now().timestamp(),
            size,
        }
    }

    pub(crate) fn key(&self) -> CacheResult<RequestKey> {
        let method = Method::from_bytes(self.method.as_bytes())
            .map_err(|e| CacheError::InvalidEntry(format!("bad method {}: {e}", self.method)))?;
        Ok(RequestKey::new(method, self.request_url.clone()))
    }

    pub(crate) fn head(&self) -> CacheResult<ResponseHead> {
        let status = reqwest::StatusCode::from_u16(self.status)
            .map_err(|e| CacheError::InvalidEntry(format!("bad status {}: {e}", self.status)))?;

        let mut headers = HeaderMap::new();
        for header in &self.headers {
            let name = header
                .name
                .parse::<HeaderName>()
                .map_err(|e| CacheError::InvalidEntry(format!("bad header name {}: {e}", header.name)))?;
            let value = HeaderValue::from_bytes(&header.value)
                .map_err(|e| CacheError::InvalidEntry(format!("bad value for header {name}: {e}")))?;
            headers.append(name, value);
        }

        Ok(ResponseHead {
            status,
            headers,
            response_type: self.response_type,
            url: self.response_url.clone(),
            redirected: self.redirected,
        })
    }
}
