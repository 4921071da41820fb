//! Worker configuration.
//!
//! Loaded from JSON (the host passes it alongside the worker's other startup
//! settings). Every field has a default, so `{}` is a valid configuration.
//!
//! ```
//! use procwire_urls::UrlsConfig;
//!
//! let config = UrlsConfig::from_json_str(r#"{"callTimeoutMs": 5000}"#).unwrap();
//! assert_eq!(config.call_timeout().as_secs(), 5);
//! assert!(config.trusted_domains.is_empty());
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;
use crate::host::{ChannelConfig, DEFAULT_CALL_TIMEOUT};

/// Configuration for the URL service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UrlsConfig {
    /// Trusted domains in effect before the host sends its own list.
    pub trusted_domains: Vec<String>,
    /// Timeout for host calls, in milliseconds.
    pub call_timeout_ms: u64,
}

impl Default for UrlsConfig {
    fn default() -> Self {
        Self {
            trusted_domains: Vec::new(),
            call_timeout_ms: DEFAULT_CALL_TIMEOUT.as_millis() as u64,
        }
    }
}

impl UrlsConfig {
    /// Parse a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Host call timeout.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Channel settings derived from this configuration.
    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            call_timeout: self.call_timeout(),
        }
    }
}
