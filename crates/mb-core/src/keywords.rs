//! Bounded keyword map
//!
//! Per-instance targeting keywords forwarded to the engine with each load.
//! Lengths are counted in characters, not bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum keyword key length (characters)
pub const MAX_KEY_CHARS: usize = 64;

/// Maximum keyword value length (characters)
pub const MAX_VALUE_CHARS: usize = 256;

/// Length limits applied to keyword insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordLimits {
    pub max_key_chars: usize,
    pub max_value_chars: usize,
}

impl Default for KeywordLimits {
    fn default() -> Self {
        Self {
            max_key_chars: MAX_KEY_CHARS,
            max_value_chars: MAX_VALUE_CHARS,
        }
    }
}

impl KeywordLimits {
    #[inline]
    pub fn accepts(&self, key: &str, value: &str) -> bool {
        !key.is_empty()
            && key.chars().count() <= self.max_key_chars
            && value.chars().count() <= self.max_value_chars
    }
}

/// Keyword map with bounded keys and values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords {
    entries: BTreeMap<String, String>,
    limits: KeywordLimits,
}

impl Keywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: KeywordLimits) -> Self {
        Self {
            entries: BTreeMap::new(),
            limits,
        }
    }

    /// Insert or overwrite a keyword.
    ///
    /// Returns `false` and leaves the map unchanged when the key is empty or
    /// either side exceeds its limit.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        if !self.limits.accepts(key, value) {
            log::warn!(
                "Keywords: rejected '{}' (key {} chars, value {} chars, limits {}/{})",
                key,
                key.chars().count(),
                value.chars().count(),
                self.limits.max_key_chars,
                self.limits.max_value_chars
            );
            return false;
        }
        self.entries.insert(key.to_string(), value.to_string());
        true
    }

    /// Remove a keyword, returning its previous value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Owned copy of the entries, in key order
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn limits(&self) -> KeywordLimits {
        self.limits
    }
}
