//! # Host Surface
//!
//! Capabilities the embedding environment provides to the interceptor
//! beyond cache storage and network access.

use async_trait::async_trait;
use tracing::info;
use url::Url;

use crate::events::NotificationOptions;

/// Lifecycle and client controls exposed by the host
#[async_trait]
pub trait Host: Send + Sync {
    /// Activate this version without waiting for older clients to close
    async fn skip_waiting(&self);

    /// Take control of every open client page
    async fn claim_clients(&self);

    async fn show_notification(&self, title: &str, options: NotificationOptions);

    /// Dismiss the notification the current event refers to
    async fn close_notification(&self);

    async fn open_window(&self, url: Url);
}

/// Host that only logs what it was asked to do
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHost;

#[async_trait]
impl Host for LoggingHost {
    async fn skip_waiting(&self) {
        info!("Host: skip waiting");
    }

    async fn claim_clients(&self) {
        info!("Host: claiming clients");
    }

    async fn show_notification(&self, title: &str, options: NotificationOptions) {
        info!(title = %title, body = %options.body, actions = options.actions.len(), "Host: show notification");
    }

    async fn close_notification(&self) {
        info!("Host: close notification");
    }

    async fn open_window(&self, url: Url) {
        info!(url = %url, "Host: open window");
    }
}
