//! Platform Adapter Tests for mb-bridge
//!
//! Runs the Android and iOS adapters end-to-end against recording fakes of
//! their engines:
//! - Android: correlation-routed fullscreen loads, hashCode-routed banners,
//!   Java error strings and bid maps
//! - iOS: placement-keyed callbacks entering through the C ABI
//! - Unsupported: every operation fails, nothing hangs

use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

use approx::assert_relative_eq;
use mb_bridge::ffi::{
    mb_ffi_context_release, mb_ffi_on_impression_data, mb_ffi_on_load_event,
    mb_ffi_on_placement_event, mb_ffi_on_reward, mb_ffi_on_win_bid,
};
use mb_bridge::{
    AdBridge, AdError, AdFormat, AdState, AndroidAdapter, BannerSize, FfiCallbackContext,
    IosAdapter, JavaAdBridge, NativeEventKind, UnsupportedAdapter,
};
use mb_bridge::adapter::{IosExterns, JavaBidMap};
use parking_lot::Mutex;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// ANDROID FAKE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
enum JavaCall {
    New(AdFormat, String),
    Keywords(i32, Vec<(String, String)>),
    Load(i32, Option<u64>),
    Show(i32, Option<String>),
    Clear(i32),
    Destroy(i32),
}

#[derive(Default)]
struct FakeJava {
    next_hash: AtomicI32,
    calls: Mutex<Vec<JavaCall>>,
    load_error: Mutex<Option<String>>,
}

impl FakeJava {
    fn calls(&self) -> Vec<JavaCall> {
        self.calls.lock().clone()
    }

    fn last_listener(&self) -> Option<u64> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            JavaCall::Load(_, listener) => *listener,
            _ => None,
        })
    }
}

impl JavaAdBridge for FakeJava {
    fn new_ad_object(
        &self,
        format: AdFormat,
        placement: &str,
        _size: Option<&BannerSize>,
    ) -> Result<i32, String> {
        self.calls
            .lock()
            .push(JavaCall::New(format, placement.to_string()));
        // Negative hashCodes are common on the Java side
        Ok(-1_000_000 - self.next_hash.fetch_add(1, Ordering::SeqCst))
    }

    fn set_keywords(&self, hash_code: i32, keywords: &[(String, String)]) -> Result<(), String> {
        self.calls
            .lock()
            .push(JavaCall::Keywords(hash_code, keywords.to_vec()));
        Ok(())
    }

    fn load(
        &self,
        hash_code: i32,
        listener_id: Option<u64>,
        _size: Option<&BannerSize>,
    ) -> Result<(), String> {
        if let Some(error) = self.load_error.lock().clone() {
            return Err(error);
        }
        self.calls.lock().push(JavaCall::Load(hash_code, listener_id));
        Ok(())
    }

    fn show(&self, hash_code: i32, custom_data: Option<&str>) -> Result<(), String> {
        self.calls
            .lock()
            .push(JavaCall::Show(hash_code, custom_data.map(str::to_string)));
        Ok(())
    }

    fn clear_loaded(&self, hash_code: i32) -> Result<(), String> {
        self.calls.lock().push(JavaCall::Clear(hash_code));
        Ok(())
    }

    fn destroy(&self, hash_code: i32) -> Result<(), String> {
        self.calls.lock().push(JavaCall::Destroy(hash_code));
        Ok(())
    }
}

fn android() -> (Arc<AndroidAdapter<FakeJava>>, AdBridge) {
    init_logging();
    let adapter = Arc::new(AndroidAdapter::new(FakeJava::default()));
    let bridge = AdBridge::new(adapter.clone());
    (adapter, bridge)
}

fn java_hash(handle: mb_bridge::NativeHandle) -> i32 {
    handle.raw() as u32 as i32
}

fn bid_map(auction: &str, partner: &str, price: &str) -> JavaBidMap {
    HashMap::from([
        ("auction-id".to_string(), auction.to_string()),
        ("partner_id".to_string(), partner.to_string()),
        ("price".to_string(), price.to_string()),
        ("line_item_id".to_string(), "li-7".to_string()),
    ])
}

// ═══════════════════════════════════════════════════════════════════════════════
// ANDROID
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_android_interstitial_lifecycle() {
    let (adapter, bridge) = android();
    assert_eq!(bridge.platform_name(), "android");

    let ad = bridge.interstitial("I1").unwrap();
    let hash = java_hash(ad.handle());
    ad.set_keyword("tier", "gold");
    ad.set_custom_data(Some("level=3".to_string())).unwrap();

    let load = ad.load();
    let listener = adapter.java().last_listener().expect("fullscreen load has a listener");
    assert!(adapter.java().calls().contains(&JavaCall::Keywords(
        hash,
        vec![("tier".to_string(), "gold".to_string())]
    )));

    adapter.on_fullscreen_ad_loaded(
        listener,
        "I1",
        None,
        Some("load-1"),
        Some(r#"{"duration": 80}"#),
        Some(&bid_map("A1", "X", "2.50")),
    );
    let success = load.await.unwrap();
    assert_eq!(success.load_id, "load-1");
    let bid = success.bid.unwrap();
    assert_eq!(bid.auction_id, "A1");
    assert_eq!(bid.line_item_id.as_deref(), Some("li-7"));
    assert_relative_eq!(bid.price, 2.50);
    assert_eq!(success.metrics.unwrap().duration_ms, Some(80));

    let show = ad.show();
    assert!(adapter
        .java()
        .calls()
        .contains(&JavaCall::Show(hash, Some("level=3".to_string()))));
    adapter.on_fullscreen_ad_shown(AdFormat::Interstitial, hash, None, None);
    assert!(show.await.is_ok());

    adapter.on_ad_clicked(AdFormat::Interstitial, hash);
    adapter.on_ad_closed(AdFormat::Interstitial, hash, None);
    assert_eq!(ad.state(), AdState::Finished);

    ad.destroy().unwrap();
    assert!(adapter.java().calls().contains(&JavaCall::Destroy(hash)));
}

#[tokio::test]
async fn test_android_error_strings_become_codes() {
    let (adapter, bridge) = android();
    let ad = bridge.rewarded("R1").unwrap();

    let load = ad.load();
    let listener = adapter.java().last_listener().unwrap();
    adapter.on_fullscreen_ad_loaded(listener, "R1", Some("CM_204 No Fill"), None, None, None);
    let error = load.await.unwrap_err();
    assert_eq!(error, AdError::native(204, "CM_204 No Fill"));
    assert_eq!(error.native_code(), Some(204));
    assert_eq!(ad.state(), AdState::Idle);
}

#[tokio::test]
async fn test_android_synchronous_load_failure_rolls_back() {
    let (adapter, bridge) = android();
    *adapter.java().load_error.lock() = Some("CM_1 SDK not initialized".to_string());
    let ad = bridge.interstitial("I1").unwrap();

    assert_eq!(ad.load().await, Err(AdError::native(1, "CM_1 SDK not initialized")));
    assert_eq!(ad.state(), AdState::Idle);

    *adapter.java().load_error.lock() = None;
    let _retry = ad.load();
    assert_eq!(ad.state(), AdState::Loading);
}

#[tokio::test]
async fn test_android_stale_listener_is_dropped() {
    let (adapter, bridge) = android();
    let ad = bridge.interstitial("I1").unwrap();

    let load = ad.load();
    let stale = adapter.java().last_listener().unwrap();
    ad.clear_loaded().unwrap();
    assert_eq!(load.await, Err(AdError::Cleared));

    let next = ad.load();
    let fresh = adapter.java().last_listener().unwrap();
    assert_ne!(stale, fresh);

    let dropped = bridge.stats().dropped;
    adapter.on_fullscreen_ad_loaded(stale, "I1", None, None, None, None);
    assert_eq!(bridge.stats().dropped, dropped + 1);
    assert_eq!(ad.state(), AdState::Loading);

    adapter.on_fullscreen_ad_loaded(fresh, "I1", None, None, None, None);
    assert!(next.await.is_ok());
}

#[tokio::test]
async fn test_android_banner_cached_and_refreshed() {
    let (adapter, bridge) = android();
    let banner = bridge.banner("B1", BannerSize::standard()).unwrap();
    let hash = java_hash(banner.handle());
    let refreshes = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&refreshes);
    banner.subscribe(
        mb_bridge::AdEventKind::DidLoad,
        Arc::new(move |event| {
            if let mb_bridge::AdEvent::DidLoad { autonomous: true, .. } = event {
                r.fetch_add(1, Ordering::SeqCst);
            }
        }),
    );
    let shows = Arc::new(AtomicUsize::new(0));
    let sh = Arc::clone(&shows);
    banner.on_did_show(move |placement, result| {
        assert_eq!(placement, "B1");
        assert!(result.is_ok());
        sh.fetch_add(1, Ordering::SeqCst);
    });

    let load = banner.load();
    assert!(adapter.java().calls().contains(&JavaCall::Load(hash, None)));
    adapter.on_ad_cached(hash, "", Some(&bid_map("A1", "X", "1.10")), Some("first"));
    assert!(load.await.is_ok());
    assert_eq!(shows.load(Ordering::SeqCst), 1);

    adapter.on_ad_cached(hash, "", Some(&bid_map("A2", "X", "1.20")), Some("refresh"));
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(shows.load(Ordering::SeqCst), 2);
    assert_eq!(banner.winning_bid().unwrap().auction_id, "A2");

    // Banners have no show on this engine
    assert!(matches!(banner.show().await, Err(AdError::Unsupported(_))));
    assert_eq!(banner.state(), AdState::Loaded);
}

#[test]
fn test_android_reward_and_revenue() {
    let (adapter, bridge) = android();
    let ad = bridge.rewarded("R1").unwrap();
    let hash = java_hash(ad.handle());

    let rewards = Arc::new(Mutex::new(Vec::new()));
    let r = Arc::clone(&rewards);
    ad.on_did_receive_reward(move |placement, amount| r.lock().push((placement.to_string(), amount)))
        .unwrap();
    adapter.on_ad_rewarded(hash);
    assert_eq!(*rewards.lock(), vec![("R1".to_string(), 0)]);

    let revenue = Arc::new(Mutex::new(None));
    let rv = Arc::clone(&revenue);
    bridge.on_impression_level_revenue(move |ilrd| {
        *rv.lock() = Some((ilrd.placement.clone(), ilrd.revenue()));
    });
    adapter.on_impression(r#"{"placementName": "R1", "ilrd": {"ad_revenue": 0.0123}}"#);
    let (placement, amount) = revenue.lock().clone().unwrap();
    assert_eq!(placement, "R1");
    assert_relative_eq!(amount.unwrap(), 0.0123);
}

#[test]
fn test_android_win_bid_reports_map() {
    let (adapter, bridge) = android();
    let ad = bridge.interstitial("I1").unwrap();
    let seen = Arc::new(Mutex::new(None));
    let s = Arc::clone(&seen);
    ad.on_did_win_bid(move |_, bid| *s.lock() = Some(bid.clone()));

    adapter.on_win_bid(AdFormat::Interstitial, java_hash(ad.handle()), &bid_map("A9", "P", "oops"));
    let bid = seen.lock().clone().unwrap();
    assert_eq!(bid.auction_id, "A9");
    assert_eq!(bid.price, 0.0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// IOS FAKE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct FakeExterns {
    next: AtomicUsize,
    keywords: Mutex<Vec<(usize, String, String)>>,
    loads: Mutex<Vec<usize>>,
    shows: Mutex<Vec<(usize, Option<String>)>>,
    freed: Mutex<Vec<usize>>,
}

impl IosExterns for FakeExterns {
    fn get_ad(&self, _format: AdFormat, placement: &str, _size: Option<&BannerSize>) -> usize {
        if placement == "missing" {
            return 0;
        }
        0x7000 + 0x10 * self.next.fetch_add(1, Ordering::SeqCst)
    }

    fn set_keyword(&self, ad: usize, key: &str, value: &str) -> bool {
        self.keywords
            .lock()
            .push((ad, key.to_string(), value.to_string()));
        true
    }

    fn load(&self, ad: usize) {
        self.loads.lock().push(ad);
    }

    fn show(&self, ad: usize, custom_data: Option<&str>) {
        self.shows.lock().push((ad, custom_data.map(str::to_string)));
    }

    fn clear_loaded(&self, _ad: usize) -> bool {
        true
    }

    fn free(&self, ad: usize) {
        self.freed.lock().push(ad);
    }
}

struct IosFixture {
    adapter: Arc<IosAdapter<FakeExterns>>,
    bridge: AdBridge,
    ctx: *mut c_void,
}

impl IosFixture {
    fn new() -> Self {
        init_logging();
        let adapter = Arc::new(IosAdapter::new(FakeExterns::default()));
        let bridge = AdBridge::new(adapter.clone());
        let ctx = FfiCallbackContext::into_raw(adapter.clone());
        Self { adapter, bridge, ctx }
    }
}

impl Drop for IosFixture {
    fn drop(&mut self) {
        unsafe { mb_ffi_context_release(self.ctx) };
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IOS
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_ios_rewarded_lifecycle_through_ffi() {
    let fx = IosFixture::new();
    let ad = fx.bridge.rewarded("R1").unwrap();
    let address = ad.handle().raw() as usize;
    ad.set_keyword("tier", "gold");
    ad.set_custom_data(Some("user=42".to_string())).unwrap();

    let rewards = Arc::new(Mutex::new(Vec::new()));
    let r = Arc::clone(&rewards);
    ad.on_did_receive_reward(move |_, amount| r.lock().push(amount))
        .unwrap();

    let load = ad.load();
    assert_eq!(*fx.adapter.externs().loads.lock(), vec![address]);
    assert_eq!(fx.adapter.externs().keywords.lock().len(), 1);

    unsafe {
        // Win-bid arrives ahead of the load result
        assert_eq!(
            mb_ffi_on_win_bid(fx.ctx, 1, c"R1".as_ptr(), c"A1".as_ptr(), c"X".as_ptr(), 2.5),
            1
        );
        assert_eq!(
            mb_ffi_on_load_event(
                fx.ctx,
                1,
                c"R1".as_ptr(),
                c"load-9".as_ptr(),
                c"{\"duration\": 42}".as_ptr(),
                0,
                ptr::null(),
            ),
            1
        );
    }
    let success = load.await.unwrap();
    assert_eq!(success.load_id, "load-9");
    assert_eq!(success.bid.unwrap().auction_id, "A1");

    let show = ad.show();
    assert_eq!(
        *fx.adapter.externs().shows.lock(),
        vec![(address, Some("user=42".to_string()))]
    );
    unsafe {
        let shown = NativeEventKind::Show as u8;
        assert_eq!(mb_ffi_on_placement_event(fx.ctx, 1, shown, c"R1".as_ptr(), 0, ptr::null()), 1);
        assert_eq!(mb_ffi_on_reward(fx.ctx, c"R1".as_ptr(), 10), 1);
        let closed = NativeEventKind::Close as u8;
        assert_eq!(mb_ffi_on_placement_event(fx.ctx, 1, closed, c"R1".as_ptr(), 0, ptr::null()), 1);
    }
    assert!(show.await.is_ok());
    assert_eq!(*rewards.lock(), vec![10]);
    assert_eq!(ad.state(), AdState::Finished);

    ad.destroy().unwrap();
    assert_eq!(*fx.adapter.externs().freed.lock(), vec![address]);
}

#[tokio::test]
async fn test_ios_load_failure_code_and_message() {
    let fx = IosFixture::new();
    let ad = fx.bridge.interstitial("I1").unwrap();

    let load = ad.load();
    unsafe {
        mb_ffi_on_load_event(
            fx.ctx,
            0,
            c"I1".as_ptr(),
            ptr::null(),
            ptr::null(),
            204,
            c"No Fill".as_ptr(),
        );
    }
    assert_eq!(load.await, Err(AdError::native(204, "No Fill")));
}

#[test]
fn test_ios_rejects_malformed_callbacks() {
    let fx = IosFixture::new();
    let ad = fx.bridge.interstitial("I1").unwrap();
    let _load = ad.load();

    unsafe {
        // Unknown format and unknown event kind
        assert_eq!(mb_ffi_on_placement_event(fx.ctx, 9, 0, c"I1".as_ptr(), 0, ptr::null()), 0);
        assert_eq!(mb_ffi_on_placement_event(fx.ctx, 0, 42, c"I1".as_ptr(), 0, ptr::null()), 0);
        // Unknown placement is accepted at the ABI and dropped by the adapter
        assert_eq!(
            mb_ffi_on_load_event(fx.ctx, 0, c"other".as_ptr(), ptr::null(), ptr::null(), 0, ptr::null()),
            1
        );
        assert_eq!(mb_ffi_on_impression_data(fx.ctx, c"not json".as_ptr()), 1);
    }
    assert_eq!(ad.state(), AdState::Loading);
    assert!(ad.has_pending_request());
}

#[test]
fn test_ios_destroyed_placement_stops_routing() {
    let fx = IosFixture::new();
    let ad = fx.bridge.interstitial("I1").unwrap();
    let clicks = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&clicks);
    ad.on_did_click(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    let click = NativeEventKind::Click as u8;
    unsafe { mb_ffi_on_placement_event(fx.ctx, 0, click, c"I1".as_ptr(), 0, ptr::null()) };
    assert_eq!(clicks.load(Ordering::SeqCst), 1);

    ad.destroy().unwrap();
    unsafe { mb_ffi_on_placement_event(fx.ctx, 0, click, c"I1".as_ptr(), 0, ptr::null()) };
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
}

#[test]
fn test_ios_null_ad_is_invalid_placement() {
    let fx = IosFixture::new();
    assert_eq!(
        fx.bridge.interstitial("missing").err(),
        Some(AdError::InvalidPlacement("missing".to_string()))
    );
}

#[test]
fn test_ios_revenue_through_ffi() {
    let fx = IosFixture::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let s = Arc::clone(&seen);
    fx.bridge.on_impression_level_revenue(move |ilrd| {
        assert_eq!(ilrd.placement, "B1");
        s.fetch_add(1, Ordering::SeqCst);
    });
    unsafe {
        mb_ffi_on_impression_data(
            fx.ctx,
            c"{\"placementName\": \"B1\", \"ilrd\": {\"ad_revenue\": 0.5}}".as_ptr(),
        );
    }
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// UNSUPPORTED
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_unsupported_platform_fails_every_operation() {
    init_logging();
    let bridge = AdBridge::new(Arc::new(UnsupportedAdapter::new()));
    let ad = bridge.interstitial("I1").unwrap();

    assert!(matches!(ad.load().await, Err(AdError::Unsupported(_))));
    assert_eq!(ad.state(), AdState::Idle);
    assert_eq!(ad.show().await, Err(AdError::NotReady));
    assert!(ad.clear_loaded().is_ok());
    assert!(ad.destroy().is_ok());
}
