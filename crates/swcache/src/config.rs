use serde::{Deserialize, Serialize};
use url::Url;

use crate::whitelist::OriginWhitelist;

/// Names of the partitions owned by one cache version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNames {
    /// `<prefix>-<version>`; derived from the same version constant but never
    /// retained on activation
    pub shared: String,
    /// `<prefix>-static-<version>`
    pub static_partition: String,
    /// `<prefix>-dynamic-<version>`
    pub dynamic_partition: String,
}

impl PartitionNames {
    pub fn new(prefix: &str, version: &str) -> Self {
        Self {
            shared: format!("{prefix}-{version}"),
            static_partition: format!("{prefix}-static-{version}"),
            dynamic_partition: format!("{prefix}-dynamic-{version}"),
        }
    }

    /// Whether `name` survives activation of this version
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_partition || name == self.dynamic_partition
    }
}

/// Appearance of push notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub icon: String,
    pub badge: String,
    /// Vibration pattern in milliseconds
    pub vibrate: Vec<u32>,
    /// Body used when a push carries no payload
    pub default_body: String,
    pub explore_title: String,
    pub close_title: String,
    /// Page opened by the "explore" action
    pub explore_target: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            icon: "./icon-192x192.png".to_string(),
            badge: "./icon-72x72.png".to_string(),
            vibrate: vec![100, 50, 100],
            default_body: "You have a new message".to_string(),
            explore_title: "View message".to_string(),
            close_title: "Close".to_string(),
            explore_target: "./index.html".to_string(),
        }
    }
}

/// Immutable interceptor configuration, resolved against the application scope.
///
/// Build one with [`InterceptorConfig::builder`].
#[derive(Debug, Clone)]
pub struct InterceptorConfig {
    pub(crate) app_name: String,
    pub(crate) version: String,
    pub(crate) partitions: PartitionNames,
    pub(crate) scope: Url,
    pub(crate) asset_manifest: Vec<Url>,
    pub(crate) origin_whitelist: OriginWhitelist,
    pub(crate) offline_shell: Url,
    pub(crate) notification: NotificationConfig,
}

impl InterceptorConfig {
    pub fn builder() -> crate::builder::InterceptorConfigBuilder {
        crate::builder::InterceptorConfigBuilder::new()
    }

    /// Notification title
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn partitions(&self) -> &PartitionNames {
        &self.partitions
    }

    pub fn static_partition(&self) -> &str {
        &self.partitions.static_partition
    }

    pub fn dynamic_partition(&self) -> &str {
        &self.partitions.dynamic_partition
    }

    /// Base URL of the application; defines "same origin"
    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// Absolute locators that must be in the static partition after install
    pub fn asset_manifest(&self) -> &[Url] {
        &self.asset_manifest
    }

    pub fn origin_whitelist(&self) -> &OriginWhitelist {
        &self.origin_whitelist
    }

    /// Entry point served when a navigation fails offline
    pub fn offline_shell(&self) -> &Url {
        &self.offline_shell
    }

    pub fn notification(&self) -> &NotificationConfig {
        &self.notification
    }

    /// Whether `url` has the application's origin
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.scope.origin()
    }
}
