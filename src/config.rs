//! Bridge configuration loaded from `epistola-bridge.toml`.
//!
//! [`BridgeConfig`] holds the poller knobs and the per-tenant credential
//! entries. Values absent from the file use sensible defaults. The
//! `EPISTOLA_API_KEY` environment variable takes precedence over the file
//! when exactly one tenant is configured.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::credentials::TenantCredentials;
use crate::error::BridgeError;

const CONFIG_FILE: &str = "epistola-bridge.toml";
const API_KEY_ENV: &str = "EPISTOLA_API_KEY";

/// Top-level configuration for the bridge.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BridgeConfig {
    #[serde(default)]
    pub poller: PollerConfig,

    /// Credential entries feeding the static resolver, one per tenant.
    #[serde(default)]
    pub tenants: Vec<TenantCredentials>,
}

/// Knobs for the polling completion consumer.
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    /// Whether the poller runs at all. Disable when Epistola delivers every
    /// completion through the webhook.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Fixed delay in seconds between poll cycle completions.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    30
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl BridgeConfig {
    /// Load configuration from `epistola-bridge.toml` in the current
    /// directory, falling back to defaults if the file does not exist.
    pub fn load() -> Result<Self, BridgeError> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        config.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// Load configuration from an explicit path, defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self, BridgeError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str::<BridgeConfig>(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    // The env var can only address one key, so it applies only to a
    // single-tenant configuration.
    fn apply_api_key_override(&mut self, key: Option<String>) {
        let Some(key) = key else { return };
        if key.is_empty() {
            return;
        }
        if let [tenant] = &mut self.tenants[..] {
            tenant.api_key = key;
        }
    }
}
