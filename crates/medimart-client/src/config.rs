//! # Client Configuration
//!
//! Configuration management for the storefront client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MEDIMART_BACKEND_URL=https://api.medimart.in                       │
//! │     MEDIMART_TIMEOUT_SECS=15                                           │
//! │     MEDIMART_TOKEN_PATH=/tmp/medimart-token                            │
//! │     MEDIMART_PERSIST_TOKEN=false                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/medimart/client.toml (Linux)                             │
//! │     ~/Library/Application Support/in.medimart.medimart/client.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000, 30s timeout, persisted token                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! [api]
//! base_url = "https://api.medimart.in"
//! timeout_secs = 30
//!
//! [session]
//! persist_token = true
//!
//! [pricing]
//! handling_threshold = 500.0
//! handling_charge = 20.0
//! delivery_threshold = 300.0
//! delivery_fee = 40.0
//! ```

use medimart_core::PricingPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// API Settings
// =============================================================================

/// Where and how to reach the storefront backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Backend origin. Requests go to `{base_url}/api/...`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Session Settings
// =============================================================================

/// Bearer token persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Keep the token on disk between runs.
    #[serde(default = "default_true")]
    pub persist_token: bool,

    /// Token file location. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            persist_token: true,
            token_path: None,
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub session: SessionSettings,

    /// Handling charge and delivery fee thresholds.
    #[serde(default)]
    pub pricing: PricingPolicy,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "Backend URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        let p = &self.pricing;
        for (name, amount) in [
            ("handling_threshold", p.handling_threshold),
            ("handling_charge", p.handling_charge),
            ("delivery_threshold", p.delivery_threshold),
            ("delivery_fee", p.delivery_fee),
        ] {
            if amount.is_negative() {
                return Err(ClientError::InvalidConfig(format!(
                    "pricing.{} must not be negative",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MEDIMART_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.api.base_url = url;
        }

        if let Ok(timeout) = std::env::var("MEDIMART_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric MEDIMART_TIMEOUT_SECS"),
            }
        }

        if let Ok(path) = std::env::var("MEDIMART_TOKEN_PATH") {
            self.session.token_path = Some(PathBuf::from(path));
        }

        if let Ok(persist) = std::env::var("MEDIMART_PERSIST_TOKEN") {
            match persist.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.session.persist_token = true,
                "0" | "false" | "no" => self.session.persist_token = false,
                _ => warn!(value = %persist, "Unknown MEDIMART_PERSIST_TOKEN value"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("in", "medimart", "medimart")
            .map(|dirs| dirs.config_dir().join("client.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Root of the REST API: `{base_url}/api/`.
    pub fn api_root(&self) -> ClientResult<Url> {
        let mut base = Url::parse(&self.api.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join("api/")?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Where the token is persisted, or `None` when persistence is off.
    pub fn token_path(&self) -> Option<PathBuf> {
        if !self.session.persist_token {
            return None;
        }
        self.session.token_path.clone().or_else(|| {
            directories::ProjectDirs::from("in", "medimart", "medimart")
                .map(|dirs| dirs.data_dir().join("auth_token"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medimart_core::Money;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.session.persist_token);
        assert_eq!(config.pricing.delivery_threshold, Money::from_rupees(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.api.base_url = "ws://localhost:8000".into();
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));

        config.api.base_url = "not a url".into();
        assert!(config.validate().unwrap_err().is_config_error());

        config.api.base_url = "https://api.medimart.in".into();
        config.api.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ClientError::InvalidConfig(_))));

        config.api.timeout_secs = 10;
        config.pricing.delivery_fee = Money::from_rupees(-1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_root() {
        let mut config = ClientConfig::default();
        assert_eq!(config.api_root().unwrap().as_str(), "http://localhost:8000/api/");

        config.api.base_url = "https://shop.example.com/backend".into();
        assert_eq!(
            config.api_root().unwrap().as_str(),
            "https://shop.example.com/backend/api/"
        );
    }

    #[test]
    fn test_token_path_respects_persistence() {
        let mut config = ClientConfig::default();
        config.session.token_path = Some(PathBuf::from("/tmp/token"));
        assert_eq!(config.token_path(), Some(PathBuf::from("/tmp/token")));

        config.session.persist_token = false;
        assert_eq!(config.token_path(), None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://api.medimart.in"

            [pricing]
            delivery_fee = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.pricing.delivery_fee, Money::from_rupees(25));
        assert_eq!(config.pricing.handling_charge, Money::from_rupees(20));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.toml");

        let mut config = ClientConfig::default();
        config.api.base_url = "https://api.medimart.in".into();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[api]"));
        assert!(contents.contains("[pricing]"));

        let loaded: ClientConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.api.base_url, "https://api.medimart.in");
        assert_eq!(loaded.pricing, PricingPolicy::default());
    }
}
