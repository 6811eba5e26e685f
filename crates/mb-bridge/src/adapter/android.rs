//! Android Adapter
//!
//! Drives a Java-object style engine through [`JavaAdBridge`]. Ad objects are
//! identified by their Java `hashCode`, errors arrive as strings and winning
//! bids as `String → String` maps.
//!
//! Fullscreen loads are answered through a per-request listener object whose
//! id is the bridge's correlation key. Banner load results arrive on the ad
//! object itself, so a banner answer resolves whichever load is pending.

use super::{
    CallbackRouter, IssueTicket, LoadRouting, NativeOperation, NativeRequest, PlatformAdapter,
};
use mb_core::{AdError, AdFormat, AdResult, BannerSize, CorrelationKey, NativeHandle, RouteKey};
use mb_event::NativePayload;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Winning bid as the Java side reports it
pub type JavaBidMap = HashMap<String, String>;

const KEY_AUCTION_ID: &str = "auction-id";
const KEY_PARTNER_ID: &str = "partner_id";
const KEY_PRICE: &str = "price";
const KEY_LINE_ITEM_ID: &str = "line_item_id";

/// Calls into the Java engine. Errors are the Java exception text.
pub trait JavaAdBridge: Send + Sync {
    /// Construct the Java ad object, returning its `hashCode`
    fn new_ad_object(
        &self,
        format: AdFormat,
        placement: &str,
        size: Option<&BannerSize>,
    ) -> Result<i32, String>;

    fn set_keywords(&self, hash_code: i32, keywords: &[(String, String)]) -> Result<(), String>;

    /// `listener_id` names the per-request load listener, when there is one
    fn load(
        &self,
        hash_code: i32,
        listener_id: Option<u64>,
        size: Option<&BannerSize>,
    ) -> Result<(), String>;

    fn show(&self, hash_code: i32, custom_data: Option<&str>) -> Result<(), String>;

    fn clear_loaded(&self, hash_code: i32) -> Result<(), String>;

    fn destroy(&self, hash_code: i32) -> Result<(), String>;
}

/// Numeric code for a Java error string.
///
/// Empty means success. `"CM_<n>..."` and `"<n>..."` carry their code;
/// anything else is -1.
pub fn error_code_from_java(error: &str) -> i32 {
    let trimmed = error.trim();
    if trimmed.is_empty() {
        return 0;
    }
    let rest = trimmed.strip_prefix("CM_").unwrap_or(trimmed);
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    rest[..digits_len].parse::<i32>().unwrap_or(-1)
}

#[inline]
fn hash_code(handle: NativeHandle) -> i32 {
    handle.raw() as u32 as i32
}

/// Code for a Java error string already known to be a failure; never 0
fn failure_code_from_java(error: &str) -> i32 {
    match error_code_from_java(error) {
        0 => -1,
        code => code,
    }
}

fn java_error(error: String) -> AdError {
    AdError::native(failure_code_from_java(&error), error)
}

fn with_java_error(payload: NativePayload, error: Option<&str>) -> NativePayload {
    match error {
        Some(message) if !message.trim().is_empty() => {
            payload.with_error(failure_code_from_java(message), message)
        }
        _ => payload,
    }
}

fn with_bid_map(mut payload: NativePayload, bid: Option<&JavaBidMap>) -> NativePayload {
    if let Some(map) = bid.filter(|m| !m.is_empty()) {
        payload.auction_id = map.get(KEY_AUCTION_ID).cloned();
        payload.partner_id = map.get(KEY_PARTNER_ID).cloned();
        payload.price = map.get(KEY_PRICE).map(|p| p.as_str().into());
        payload.line_item_id = map.get(KEY_LINE_ITEM_ID).cloned();
    }
    payload
}

pub struct AndroidAdapter<J: JavaAdBridge> {
    java: J,
    router: RwLock<CallbackRouter>,
    placements: RwLock<HashMap<i32, String>>,
}

impl<J: JavaAdBridge> AndroidAdapter<J> {
    pub fn new(java: J) -> Self {
        Self {
            java,
            router: RwLock::new(CallbackRouter::detached()),
            placements: RwLock::new(HashMap::new()),
        }
    }

    pub fn java(&self) -> &J {
        &self.java
    }

    fn router(&self) -> CallbackRouter {
        self.router.read().clone()
    }

    fn payload(&self, hash: i32) -> NativePayload {
        let placement = self.placements.read().get(&hash).cloned().unwrap_or_default();
        NativePayload::new(placement)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // JAVA LISTENER ENTRY POINTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Fullscreen load listener answered
    pub fn on_fullscreen_ad_loaded(
        &self,
        listener_id: u64,
        placement: &str,
        error: Option<&str>,
        load_id: Option<&str>,
        metrics_json: Option<&str>,
        bid: Option<&JavaBidMap>,
    ) {
        let mut payload = with_bid_map(with_java_error(NativePayload::new(placement), error), bid);
        payload.load_id = load_id.map(str::to_string);
        payload.metrics_json = metrics_json.map(str::to_string);
        self.router()
            .on_load(RouteKey::Correlation(CorrelationKey(listener_id)), payload);
    }

    pub fn on_fullscreen_ad_shown(
        &self,
        format: AdFormat,
        hash: i32,
        error: Option<&str>,
        metrics_json: Option<&str>,
    ) {
        let mut payload = with_java_error(self.payload(hash), error);
        payload.metrics_json = metrics_json.map(str::to_string);
        self.router()
            .on_show(RouteKey::handle(format, NativeHandle::from_hash_code(hash)), payload);
    }

    /// Banner load result, publisher-requested or refresh
    pub fn on_ad_cached(&self, hash: i32, error: &str, bid: Option<&JavaBidMap>, load_id: Option<&str>) {
        let mut payload = with_bid_map(with_java_error(self.payload(hash), Some(error)), bid);
        payload.load_id = load_id.map(str::to_string);
        self.router().on_load(
            RouteKey::handle(AdFormat::Banner, NativeHandle::from_hash_code(hash)),
            payload,
        );
    }

    pub fn on_ad_clicked(&self, format: AdFormat, hash: i32) {
        self.router()
            .on_click(RouteKey::handle(format, NativeHandle::from_hash_code(hash)), self.payload(hash));
    }

    pub fn on_ad_closed(&self, format: AdFormat, hash: i32, error: Option<&str>) {
        let payload = with_java_error(self.payload(hash), error);
        self.router()
            .on_close(RouteKey::handle(format, NativeHandle::from_hash_code(hash)), payload);
    }

    pub fn on_ad_expired(&self, format: AdFormat, hash: i32) {
        self.router()
            .on_expire(RouteKey::handle(format, NativeHandle::from_hash_code(hash)), self.payload(hash));
    }

    pub fn on_ad_impression_recorded(&self, format: AdFormat, hash: i32) {
        self.router().on_impression(
            RouteKey::handle(format, NativeHandle::from_hash_code(hash)),
            self.payload(hash),
        );
    }

    /// The Java reward callback carries no amount
    pub fn on_ad_rewarded(&self, hash: i32) {
        self.router().on_reward(
            RouteKey::handle(AdFormat::Rewarded, NativeHandle::from_hash_code(hash)),
            self.payload(hash).with_reward(0),
        );
    }

    pub fn on_win_bid(&self, format: AdFormat, hash: i32, bid: &JavaBidMap) {
        let payload = with_bid_map(self.payload(hash), Some(bid));
        self.router()
            .on_win_bid(RouteKey::handle(format, NativeHandle::from_hash_code(hash)), payload);
    }

    /// ILRD observer
    pub fn on_impression(&self, json: &str) {
        self.router().on_impression_data(json);
    }
}

impl<J: JavaAdBridge> PlatformAdapter for AndroidAdapter<J> {
    fn platform_name(&self) -> &'static str {
        "android"
    }

    fn create(
        &self,
        format: AdFormat,
        placement: &str,
        banner_size: Option<&BannerSize>,
    ) -> AdResult<NativeHandle> {
        let hash = self
            .java
            .new_ad_object(format, placement, banner_size)
            .map_err(java_error)?;
        self.placements.write().insert(hash, placement.to_string());
        Ok(NativeHandle::from_hash_code(hash))
    }

    fn issue(&self, request: NativeRequest<'_>) -> AdResult<IssueTicket> {
        let hash = hash_code(request.handle);
        let params = &request.params;

        match request.operation {
            NativeOperation::Load => {
                if !params.keywords.is_empty() {
                    self.java
                        .set_keywords(hash, &params.keywords)
                        .map_err(java_error)?;
                }
                self.java
                    .load(hash, params.correlation.map(|k| k.0), params.banner_size.as_ref())
                    .map_err(java_error)?;
                Ok(match params.correlation {
                    Some(key) => IssueTicket::Correlation(key),
                    None => IssueTicket::Handle(request.handle),
                })
            }
            NativeOperation::Show => {
                if request.format == AdFormat::Banner {
                    return Err(AdError::Unsupported(
                        "banners are displayed when loaded".to_string(),
                    ));
                }
                self.java
                    .show(hash, params.custom_data.as_deref())
                    .map_err(java_error)?;
                Ok(IssueTicket::Handle(request.handle))
            }
            NativeOperation::ClearLoaded => {
                self.java.clear_loaded(hash).map_err(java_error)?;
                Ok(IssueTicket::Accepted)
            }
            NativeOperation::Destroy => {
                self.placements.write().remove(&hash);
                self.java.destroy(hash).map_err(java_error)?;
                Ok(IssueTicket::Accepted)
            }
        }
    }

    fn load_routing(&self, format: AdFormat) -> LoadRouting {
        if format.is_fullscreen() {
            LoadRouting::ByCorrelation
        } else {
            LoadRouting::ByHandle
        }
    }

    fn subscribe_callbacks(&self, router: CallbackRouter) {
        *self.router.write() = router;
    }
}
