//! Bridge Configuration
//!
//! Tunables for one bridge instance. Every field has a default, so a host can
//! supply a partial TOML or JSON document:
//!
//! ```toml
//! log_tag = "MyGame.Ads"
//!
//! [keywords]
//! max_key_chars = 64
//! max_value_chars = 256
//!
//! [dispatch]
//! log_dropped_events = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{MbError, MbResult};
use crate::keywords::KeywordLimits;

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Prefix used in bridge log lines
    pub log_tag: String,
    /// Keyword length limits for every ad instance
    pub keywords: KeywordLimits,
    /// Callback dispatch behavior
    pub dispatch: DispatchConfig,
    /// Identity registry sizing
    pub registry: RegistryConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_tag: "MediationBridge".to_string(),
            keywords: KeywordLimits::default(),
            dispatch: DispatchConfig::default(),
            registry: RegistryConfig::default(),
        }
    }
}

/// Dispatch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Log callbacks that could not be routed to a live instance
    pub log_dropped_events: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            log_dropped_events: true,
        }
    }
}

/// Identity registry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Pre-allocated route slots
    pub initial_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
        }
    }
}

impl BridgeConfig {
    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> MbResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| MbError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from JSON text
    pub fn from_json_str(text: &str) -> MbResult<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| MbError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml` or `.json` file
    pub fn load(path: &Path) -> MbResult<Self> {
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("toml") | None => Self::from_toml_str(&text),
            Some(other) => Err(MbError::Config(format!(
                "unsupported config extension '.{}'",
                other
            ))),
        }
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> MbResult<String> {
        toml::to_string_pretty(self).map_err(|e| MbError::Serialization(e.to_string()))
    }

    /// Reject limits that would make every keyword insertion fail
    pub fn validate(&self) -> MbResult<()> {
        if self.keywords.max_key_chars == 0 {
            return Err(MbError::Config("keywords.max_key_chars must be > 0".into()));
        }
        if self.log_tag.trim().is_empty() {
            return Err(MbError::Config("log_tag must not be empty".into()));
        }
        Ok(())
    }
}
