//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dispatcher.
//! All types derive Serde traits for deserialization from config files.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Multi-application resolution settings.
    pub app: AppConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Multi-application settings, the `[app]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// App used when nothing else resolves.
    pub default_app: String,

    /// Domain or sub-domain to app name. `*` is the wildcard entry.
    pub domain_bind: BTreeMap<String, String>,

    /// First path segment to app name. `*` is the wildcard entry.
    pub app_map: BTreeMap<String, String>,

    /// App names that can never be reached directly by path.
    pub deny_app_list: BTreeSet<String>,

    /// Fall back to the default app when the resolved directory is missing.
    pub app_express: bool,

    /// Namespace override applied to every app.
    pub app_namespace: Option<String>,

    /// Extension of auto-loaded resource files, without the dot.
    pub config_ext: String,

    /// Directory holding one sub-directory per app.
    pub base_path: PathBuf,

    /// Root of per-app runtime/cache directories.
    pub runtime_path: PathBuf,

    /// Locale of the default language pack.
    pub default_lang: String,

    /// Pins the deployment to a single app.
    pub bind: Option<String>,

    /// Fixed app directory, overrides `base_path/<name>`.
    pub bind_path: Option<PathBuf>,

    /// Entry-point name or front-controller path (`public/admin.php`).
    pub entry: String,

    /// Root domain used to derive the request sub-domain.
    pub domain_root: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_app: "index".to_string(),
            domain_bind: BTreeMap::new(),
            app_map: BTreeMap::new(),
            deny_app_list: BTreeSet::new(),
            app_express: false,
            app_namespace: None,
            config_ext: "toml".to_string(),
            base_path: PathBuf::from("app"),
            runtime_path: PathBuf::from("runtime"),
            default_lang: "zh-cn".to_string(),
            bind: None,
            bind_path: None,
            entry: String::new(),
            domain_root: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: DispatcherConfig = toml::from_str("").unwrap();
        assert_eq!(config.app.default_app, "index");
        assert_eq!(config.app.config_ext, "toml");
        assert!(!config.app.app_express);
        assert!(config.app.bind.is_none());
    }

    #[test]
    fn test_app_tables_parse() {
        let raw = r#"
            [app]
            default_app = "home"
            app_express = true
            deny_app_list = ["common"]

            [app.domain_bind]
            "a.b.com" = "shop"
            "*" = "portal"

            [app.app_map]
            manage = "admin"
        "#;
        let config: DispatcherConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.app.default_app, "home");
        assert!(config.app.app_express);
        assert!(config.app.deny_app_list.contains("common"));
        assert_eq!(config.app.domain_bind.get("*").map(String::as_str), Some("portal"));
        assert_eq!(config.app.app_map.get("manage").map(String::as_str), Some("admin"));
    }
}
