//! Load/show result snapshots
//!
//! Attached to an ad instance when a load completes successfully and cleared
//! when the ad is consumed, cleared or fails to load.

use serde::{Deserialize, Serialize};

/// Winning bid of the auction that filled a placement
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BidInfo {
    pub auction_id: String,
    pub partner_id: String,
    /// Price as reported by the engine (0.0 when unparseable)
    pub price: f64,
    pub line_item_id: Option<String>,
}

impl BidInfo {
    pub fn new(auction_id: impl Into<String>, partner_id: impl Into<String>, price: f64) -> Self {
        Self {
            auction_id: auction_id.into(),
            partner_id: partner_id.into(),
            price,
            line_item_id: None,
        }
    }

    pub fn with_line_item(mut self, line_item_id: impl Into<String>) -> Self {
        self.line_item_id = Some(line_item_id.into());
        self
    }
}

/// Metrics reported by the engine alongside a load or show
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadMetrics {
    /// Engine load identifier (empty when not reported)
    pub load_id: String,
    /// Total request duration, when the engine reports one
    pub duration_ms: Option<u64>,
    /// Full metrics object as received
    pub raw: serde_json::Value,
}

impl LoadMetrics {
    /// Parse a metrics JSON object.
    ///
    /// Malformed text degrades to empty metrics (logged), never an error.
    pub fn from_json_str(load_id: &str, text: &str) -> Self {
        let raw = match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("LoadMetrics: malformed metrics JSON, ignoring ({})", e);
                serde_json::Value::Null
            }
        };

        let duration_ms = raw
            .get("duration")
            .or_else(|| raw.get("duration_ms"))
            .and_then(serde_json::Value::as_u64);

        Self {
            load_id: load_id.to_string(),
            duration_ms,
            raw,
        }
    }
}

/// Successful load result handed to the caller and to `DidLoad` handlers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadSuccess {
    pub load_id: String,
    pub bid: Option<BidInfo>,
    pub metrics: Option<LoadMetrics>,
}

/// Successful show result
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShowSuccess {
    pub metrics: Option<LoadMetrics>,
}
