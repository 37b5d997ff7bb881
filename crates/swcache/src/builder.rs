//! # Builder for InterceptorConfig
//!
//! Fluent, serde-deserializable builder that validates the raw settings and
//! resolves every relative locator against the application scope.
//!
//! # Example
//!
//! ```
//! use swcache_engine::InterceptorConfig;
//!
//! let config = InterceptorConfig::builder()
//!     .with_scope("https://app.example/ephone/")
//!     .with_version("v1.4.0")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.static_partition(), "ephone-static-v1.4.0");
//! assert_eq!(config.offline_shell().as_str(), "https://app.example/ephone/index.html");
//! ```

use serde::Deserialize;
use url::Url;

use crate::config::{InterceptorConfig, NotificationConfig, PartitionNames};
use crate::error::InterceptError;
use crate::whitelist::{DEFAULT_ORIGIN_PATTERNS, OriginWhitelist};

/// Application shell assets cached at install time
pub const DEFAULT_ASSET_MANIFEST: &[&str] = &[
    "./",
    "./index.html",
    "./manifest.json",
    "https://i.postimg.cc/28p9L8FY/sogou20250606-073214826037-png.png",
];

/// Builder for creating InterceptorConfig instances with a fluent API
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InterceptorConfigBuilder {
    cache_prefix: String,
    version: String,
    app_name: String,
    scope: Option<String>,
    asset_manifest: Vec<String>,
    origin_whitelist: Vec<String>,
    offline_shell: String,
    notification: NotificationConfig,
}

impl Default for InterceptorConfigBuilder {
    fn default() -> Self {
        Self {
            cache_prefix: "ephone".to_string(),
            version: "v1.3.0".to_string(),
            app_name: "EPhone".to_string(),
            scope: None,
            asset_manifest: DEFAULT_ASSET_MANIFEST.iter().map(|s| s.to_string()).collect(),
            origin_whitelist: DEFAULT_ORIGIN_PATTERNS.iter().map(|s| s.to_string()).collect(),
            offline_shell: "./index.html".to_string(),
            notification: NotificationConfig::default(),
        }
    }
}

impl InterceptorConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load builder settings from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, InterceptError> {
        serde_json::from_str(json)
            .map_err(|e| InterceptError::Config(format!("Invalid configuration JSON: {e}")))
    }

    pub fn with_cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    /// Set the version tag embedded in every partition name
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Set the application's base URL
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Replace the asset manifest
    pub fn with_asset_manifest<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.asset_manifest = assets.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the external origin whitelist (regular expressions)
    pub fn with_origin_whitelist<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.origin_whitelist = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_offline_shell(mut self, locator: impl Into<String>) -> Self {
        self.offline_shell = locator.into();
        self
    }

    pub fn with_notification(mut self, notification: NotificationConfig) -> Self {
        self.notification = notification;
        self
    }

    /// Validate and resolve the configuration
    pub fn build(self) -> Result<InterceptorConfig, InterceptError> {
        let scope = self
            .scope
            .as_deref()
            .ok_or_else(|| InterceptError::Config("scope is required".to_string()))?;
        let scope = Url::parse(scope)?;
        if scope.cannot_be_a_base() {
            return Err(InterceptError::Config(format!(
                "scope {scope} cannot be used as a base URL"
            )));
        }

        if self.cache_prefix.is_empty() || self.version.is_empty() {
            return Err(InterceptError::Config(
                "cache prefix and version must not be empty".to_string(),
            ));
        }

        let asset_manifest = self
            .asset_manifest
            .iter()
            .map(|locator| scope.join(locator))
            .collect::<Result<Vec<_>, _>>()?;

        let offline_shell = scope.join(&self.offline_shell)?;

        let origin_whitelist = OriginWhitelist::new(&self.origin_whitelist)
            .map_err(|e| InterceptError::Config(format!("Invalid origin pattern: {e}")))?;

        Ok(InterceptorConfig {
            partitions: PartitionNames::new(&self.cache_prefix, &self.version),
            app_name: self.app_name,
            version: self.version,
            scope,
            asset_manifest,
            origin_whitelist,
            offline_shell,
            notification: self.notification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = InterceptorConfigBuilder::new()
            .with_scope("https://app.example/ephone/")
            .build()
            .unwrap();

        assert_eq!(config.app_name(), "EPhone");
        assert_eq!(config.static_partition(), "ephone-static-v1.3.0");
        assert_eq!(config.dynamic_partition(), "ephone-dynamic-v1.3.0");
        assert_eq!(config.partitions().shared, "ephone-v1.3.0");

        let manifest: Vec<&str> = config.asset_manifest().iter().map(Url::as_str).collect();
        assert_eq!(
            manifest,
            vec![
                "https://app.example/ephone/",
                "https://app.example/ephone/index.html",
                "https://app.example/ephone/manifest.json",
                "https://i.postimg.cc/28p9L8FY/sogou20250606-073214826037-png.png",
            ]
        );
        assert_eq!(config.origin_whitelist().patterns().count(), 4);
    }

    #[test]
    fn test_builder_customization() {
        let config = InterceptorConfigBuilder::new()
            .with_scope("https://chat.example/")
            .with_cache_prefix("chat")
            .with_version("v2")
            .with_app_name("Chat")
            .with_asset_manifest(["./", "./app.js"])
            .with_origin_whitelist([r"^https://cdn\.example/"])
            .with_offline_shell("./offline.html")
            .build()
            .unwrap();

        assert_eq!(config.static_partition(), "chat-static-v2");
        assert_eq!(config.asset_manifest().len(), 2);
        assert_eq!(config.offline_shell().as_str(), "https://chat.example/offline.html");
        assert!(
            config
                .origin_whitelist()
                .matches(&Url::parse("https://cdn.example/a.css").unwrap())
        );
    }

    #[test]
    fn test_scope_is_required() {
        let result = InterceptorConfigBuilder::new().build();
        assert!(matches!(result, Err(InterceptError::Config(_))));

        let result = InterceptorConfigBuilder::new().with_scope("not a url").build();
        assert!(matches!(result, Err(InterceptError::InvalidUrl(_))));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = InterceptorConfigBuilder::new()
            .with_scope("https://app.example/")
            .with_origin_whitelist(["(unclosed"])
            .build();
        assert!(matches!(result, Err(InterceptError::Config(_))));
    }

    #[test]
    fn test_from_json_keeps_defaults() {
        let config = InterceptorConfigBuilder::from_json(
            r#"{"scope": "https://app.example/", "version": "v1.4.0",
                "notification": {"vibrate": [200]}}"#,
        )
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(config.version(), "v1.4.0");
        assert_eq!(config.static_partition(), "ephone-static-v1.4.0");
        assert_eq!(config.asset_manifest().len(), 4);
        assert_eq!(config.notification().vibrate, vec![200]);
        assert_eq!(config.notification().icon, "./icon-192x192.png");
    }

    #[test]
    fn test_same_origin_check() {
        let config = InterceptorConfigBuilder::new()
            .with_scope("https://app.example/ephone/")
            .build()
            .unwrap();

        assert!(config.is_same_origin(&Url::parse("https://app.example/other").unwrap()));
        assert!(!config.is_same_origin(&Url::parse("http://app.example/").unwrap()));
        assert!(!config.is_same_origin(&Url::parse("https://unpkg.com/").unwrap()));
    }
}
