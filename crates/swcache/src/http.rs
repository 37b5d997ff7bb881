//! # Request and Response Model
//!
//! The request/response pair the interceptor reasons about. A [`Response`]
//! owns a single-use [`Body`]; the only way to forward a response and store it
//! at the same time is [`Response::duplicate`], which hands out two
//! independently readable halves.

use std::fmt;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

/// What kind of resource a request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// A top-level page navigation
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    /// Plain `fetch()` calls and anything unclassified
    #[default]
    Empty,
}

/// Classification of a response relative to the requesting origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response with readable status and body
    Basic,
    /// Cross-origin response allowed by CORS
    Cors,
    /// Cross-origin response whose status and body are hidden
    Opaque,
    /// Redirect captured in manual redirect mode
    OpaqueRedirect,
    /// Network error placeholder
    Error,
    #[default]
    Default,
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Opaque => "opaque",
            ResponseType::OpaqueRedirect => "opaqueredirect",
            ResponseType::Error => "error",
            ResponseType::Default => "default",
        };
        f.write_str(name)
    }
}

/// An intercepted request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
    pub headers: HeaderMap,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            destination: Destination::Empty,
            headers: HeaderMap::new(),
        }
    }

    /// A plain GET request
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// A GET request for a top-level document
    pub fn navigate(url: Url) -> Self {
        Self::get(url).with_destination(Destination::Document)
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.destination == Destination::Document
    }
}

/// A response body that can be read exactly once
#[derive(Debug, Default)]
pub struct Body(Bytes);

impl Body {
    pub fn empty() -> Self {
        Self(Bytes::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the body and return its bytes
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self(Bytes::from_static(text.as_bytes()))
    }
}

/// A response produced by the network or read back from a cache partition.
///
/// Not `Clone`: use [`Response::duplicate`] to obtain a second readable copy.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub response_type: ResponseType,
    /// Final URL after redirects, if known
    pub url: Option<Url>,
    pub redirected: bool,
    body: Body,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Body>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            response_type: ResponseType::Default,
            url: None,
            redirected: false,
            body: body.into(),
        }
    }

    /// A 200 response classified as same-origin
    pub fn basic(body: impl Into<Body>) -> Self {
        Self::new(StatusCode::OK, body).with_type(ResponseType::Basic)
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn with_redirected(mut self, redirected: bool) -> Self {
        self.redirected = redirected;
        self
    }

    /// Whether the status is in the 2xx range
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Split into two responses whose bodies can each be read once.
    pub fn duplicate(self) -> (Response, Response) {
        let bytes = self.body.into_bytes();
        let copy = Response {
            status: self.status,
            headers: self.headers.clone(),
            response_type: self.response_type,
            url: self.url.clone(),
            redirected: self.redirected,
            body: Body(bytes.clone()),
        };
        let original = Response {
            status: self.status,
            headers: self.headers,
            response_type: self.response_type,
            url: self.url,
            redirected: self.redirected,
            body: Body(bytes),
        };
        (original, copy)
    }

    /// Consume the response and return its body
    pub fn into_body(self) -> Body {
        self.body
    }

    /// Consume the response and return the body bytes
    pub fn bytes(self) -> Bytes {
        self.body.into_bytes()
    }

    /// Split the response into its metadata and body bytes
    pub(crate) fn into_parts(self) -> (ResponseHead, Bytes) {
        let head = ResponseHead {
            status: self.status,
            headers: self.headers,
            response_type: self.response_type,
            url: self.url,
            redirected: self.redirected,
        };
        (head, self.body.into_bytes())
    }

    pub(crate) fn from_parts(head: ResponseHead, body: Bytes) -> Self {
        Self {
            status: head.status,
            headers: head.headers,
            response_type: head.response_type,
            url: head.url,
            redirected: head.redirected,
            body: Body(body),
        }
    }
}

/// Everything in a response except its body
#[derive(Debug, Clone)]
pub(crate) struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub response_type: ResponseType,
    pub url: Option<Url>,
    pub redirected: bool,
}
