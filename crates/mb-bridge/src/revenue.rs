//! Impression-level revenue data
//!
//! Bridge-wide events the engine raises after an impression, carrying the
//! placement name and an engine-defined revenue object:
//!
//! ```json
//! { "placementName": "I1", "ilrd": { "network_name": "...", "ad_revenue": 0.0042 } }
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpressionLevelRevenue {
    #[serde(rename = "placementName", default)]
    pub placement: String,
    /// Revenue object as received
    #[serde(default)]
    pub ilrd: serde_json::Value,
}

impl ImpressionLevelRevenue {
    /// Parse the engine's JSON; malformed text is logged and yields `None`
    pub fn from_json_str(text: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(text) {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("ILRD: malformed impression data, dropping ({})", e);
                None
            }
        }
    }

    /// Numeric revenue field, if the engine reported one
    pub fn revenue(&self) -> Option<f64> {
        self.ilrd.get("ad_revenue").and_then(serde_json::Value::as_f64)
    }
}
