//! # Network Access
//!
//! The [`Network`] trait is the interceptor's only route to the outside
//! world. [`HttpNetwork`] implements it on top of `reqwest`.

mod client;
mod config;
pub mod proxy;

use async_trait::async_trait;

use crate::error::NetworkError;
use crate::http::{Request, Response};

pub use client::{HttpNetwork, create_client};
pub use config::NetworkConfig;
pub use proxy::{ProxyAuth, ProxyConfig, ProxyType};

/// Issues requests to the network
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: Request) -> Result<Response, NetworkError>;
}
