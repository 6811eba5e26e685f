//! Mediation Bridge
//!
//! Request/response ad operations over a native engine that only answers
//! through fire-and-forget callbacks on threads it owns.
//!
//! ```text
//!  application                       native engine
//!  ───────────                       ─────────────
//!  AdBridge::interstitial("I1") ───▶ PlatformAdapter::create
//!  ad.load().await              ───▶ PlatformAdapter::issue(Load)
//!                                        │
//!                                        ▼  (any thread)
//!  DidLoad handlers ◀── AdInstance ◀── EventDispatcher ◀── CallbackRouter
//!  load future resolves    (state machine)   (IdentityRegistry)
//! ```
//!
//! ## Modules
//! - `instance`: per-placement lifecycle state machine
//! - `adapter`: platform adapter trait and its Android, iOS, unsupported and loopback variants
//! - `bridge`: composition root owning registry, dispatcher and adapter
//! - `ffi`: C ABI entry points for engines that call back through exported functions

pub mod adapter;
pub mod bridge;
pub mod ffi;
pub mod instance;
pub mod request;
pub mod revenue;
pub mod state;

pub use adapter::{
    AndroidAdapter, CallbackRouter, IosAdapter, IssueTicket, JavaAdBridge, LoadRouting,
    LoopbackAdapter, NativeCallbackSink, NativeOperation, NativeRequest, PlacementCallbacks,
    PlatformAdapter, RequestParams, UnsupportedAdapter,
};
pub use bridge::{AdBridge, RevenueHandler};
pub use ffi::FfiCallbackContext;
pub use instance::AdInstance;
pub use request::{AdFuture, LoadFuture, ShowFuture};
pub use revenue::ImpressionLevelRevenue;
pub use state::AdState;

pub use mb_core::{
    AdError, AdFormat, AdResult, BannerSize, BidInfo, BridgeConfig, LoadMetrics, LoadSuccess,
    NativeHandle, ShowSuccess,
};
pub use mb_event::{AdEvent, AdEventKind, DispatchStats, NativeEventKind, NativePayload, SubscriptionId};
