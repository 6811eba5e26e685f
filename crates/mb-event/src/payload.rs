//! Native Payload Decoding
//!
//! Callbacks arrive as loose bags of strings and numbers. Decoding never fails:
//! missing optional fields become `None`, unparseable prices become 0.0,
//! malformed JSON becomes empty metrics. Each degradation is logged.

use mb_core::{BidInfo, LoadMetrics};

// ═══════════════════════════════════════════════════════════════════════════════
// RAW PAYLOAD
// ═══════════════════════════════════════════════════════════════════════════════

/// Price as delivered by the engine: some platforms send a number, others text
#[derive(Debug, Clone, PartialEq)]
pub enum PriceField {
    Number(f64),
    Text(String),
}

impl From<f64> for PriceField {
    fn from(value: f64) -> Self {
        PriceField::Number(value)
    }
}

impl From<&str> for PriceField {
    fn from(value: &str) -> Self {
        PriceField::Text(value.to_string())
    }
}

impl From<String> for PriceField {
    fn from(value: String) -> Self {
        PriceField::Text(value)
    }
}

/// Untyped callback fields as received from the native side
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativePayload {
    pub placement: String,
    /// 0 = success, anything else is an engine-defined failure
    pub error_code: i32,
    pub error_message: String,
    pub auction_id: Option<String>,
    pub partner_id: Option<String>,
    pub price: Option<PriceField>,
    pub line_item_id: Option<String>,
    pub reward: Option<i32>,
    pub load_id: Option<String>,
    pub metrics_json: Option<String>,
}

impl NativePayload {
    pub fn new(placement: impl Into<String>) -> Self {
        Self {
            placement: placement.into(),
            ..Default::default()
        }
    }

    pub fn with_error(mut self, code: i32, message: impl Into<String>) -> Self {
        self.error_code = code;
        self.error_message = message.into();
        self
    }

    pub fn with_bid(
        mut self,
        auction_id: impl Into<String>,
        partner_id: impl Into<String>,
        price: impl Into<PriceField>,
    ) -> Self {
        self.auction_id = Some(auction_id.into());
        self.partner_id = Some(partner_id.into());
        self.price = Some(price.into());
        self
    }

    pub fn with_line_item(mut self, line_item_id: impl Into<String>) -> Self {
        self.line_item_id = Some(line_item_id.into());
        self
    }

    pub fn with_reward(mut self, reward: i32) -> Self {
        self.reward = Some(reward);
        self
    }

    pub fn with_load_id(mut self, load_id: impl Into<String>) -> Self {
        self.load_id = Some(load_id.into());
        self
    }

    pub fn with_metrics_json(mut self, json: impl Into<String>) -> Self {
        self.metrics_json = Some(json.into());
        self
    }

    /// Decode into typed fields. Never fails.
    pub fn decode(&self) -> DecodedPayload {
        let outcome = if self.error_code == 0 {
            if !self.error_message.is_empty() {
                log::debug!(
                    "payload: '{}' reported success with message '{}'",
                    self.placement,
                    self.error_message
                );
            }
            Outcome::Success
        } else {
            Outcome::Failure {
                code: self.error_code,
                message: self.error_message.clone(),
            }
        };

        let has_bid = self.auction_id.is_some() || self.partner_id.is_some() || self.price.is_some();
        let bid = has_bid.then(|| BidInfo {
            auction_id: self.auction_id.clone().unwrap_or_default(),
            partner_id: self.partner_id.clone().unwrap_or_default(),
            price: match &self.price {
                Some(PriceField::Number(n)) => finite_or_zero(*n),
                Some(PriceField::Text(text)) => parse_price(text),
                None => 0.0,
            },
            line_item_id: self.line_item_id.clone(),
        });

        let load_id = self.load_id.clone().filter(|id| !id.is_empty());
        let metrics = self.metrics_json.as_deref().map(|json| {
            LoadMetrics::from_json_str(load_id.as_deref().unwrap_or_default(), json)
        });

        DecodedPayload {
            placement: self.placement.clone(),
            outcome,
            bid,
            reward: self.reward,
            load_id,
            metrics,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECODED PAYLOAD
// ═══════════════════════════════════════════════════════════════════════════════

/// Success or engine failure carried by a callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure { code: i32, message: String },
}

impl Outcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Typed view of a callback payload
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPayload {
    pub placement: String,
    pub outcome: Outcome,
    pub bid: Option<BidInfo>,
    pub reward: Option<i32>,
    pub load_id: Option<String>,
    pub metrics: Option<LoadMetrics>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE PARSING
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse a price string; malformed or non-finite values degrade to 0.0
pub fn parse_price(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        Ok(_) | Err(_) => {
            log::warn!("payload: failed to parse price '{}', defaulting to 0.0", text);
            0.0
        }
    }
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        log::warn!("payload: non-finite price {}, defaulting to 0.0", value);
        0.0
    }
}
