//! Platform Adapter
//!
//! The capability the lifecycle state machine drives: create native ad objects,
//! issue operations on them, and forward native callbacks back into the bridge.
//!
//! Variants:
//! - `AndroidAdapter`: Java-object style engine (hash-code handles, string errors)
//! - `IosAdapter`: exported-function style engine (pointer handles, placement-keyed callbacks)
//! - `UnsupportedAdapter`: hosts without a native engine
//! - `LoopbackAdapter`: in-process scripted engine

pub mod android;
pub mod ios;
pub mod loopback;
pub mod unsupported;

pub use android::{AndroidAdapter, JavaAdBridge, JavaBidMap, error_code_from_java};
pub use ios::{IosAdapter, IosExterns, PlacementCallbacks};
pub use loopback::{IssuedCall, LoopbackAdapter};
pub use unsupported::UnsupportedAdapter;

use mb_core::{AdFormat, AdResult, BannerSize, CorrelationKey, NativeHandle, RouteKey};
use mb_event::{NativeEventKind, NativePayload};
use std::fmt;
use std::sync::Weak;

// ═══════════════════════════════════════════════════════════════════════════════
// REQUESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Operation issued to the native engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeOperation {
    Load,
    Show,
    ClearLoaded,
    Destroy,
}

impl fmt::Display for NativeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NativeOperation::Load => "load",
            NativeOperation::Show => "show",
            NativeOperation::ClearLoaded => "clear_loaded",
            NativeOperation::Destroy => "destroy",
        };
        f.write_str(name)
    }
}

/// Per-request parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    /// Keyword snapshot taken when the request was issued
    pub keywords: Vec<(String, String)>,
    pub custom_data: Option<String>,
    pub banner_size: Option<BannerSize>,
    /// Route key answers must use, for correlation-routed loads
    pub correlation: Option<CorrelationKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NativeRequest<'a> {
    pub operation: NativeOperation,
    pub format: AdFormat,
    pub handle: NativeHandle,
    pub placement: &'a str,
    pub params: RequestParams,
}

/// Adapter acknowledgement of an issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueTicket {
    /// Answers will be routed by this handle
    Handle(NativeHandle),
    /// Answers will be routed by this correlation key
    Correlation(CorrelationKey),
    /// Fire-and-forget operation accepted
    Accepted,
}

/// How load answers for a format find their instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadRouting {
    /// The engine answers on the instance handle
    #[default]
    ByHandle,
    /// The engine echoes a per-request correlation key; handle-routed load
    /// callbacks are then engine-initiated refreshes
    ByCorrelation,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALLBACKS
// ═══════════════════════════════════════════════════════════════════════════════

/// Receiver of normalized native callbacks
pub trait NativeCallbackSink: Send + Sync {
    fn deliver(&self, route: RouteKey, kind: NativeEventKind, payload: NativePayload);

    /// Bridge-wide impression-level revenue JSON
    fn deliver_impression_level_revenue(&self, json: &str);
}

/// Non-owning handle adapters use to reach the bridge.
///
/// Delivery after the bridge is gone is a logged no-op.
#[derive(Clone, Default)]
pub struct CallbackRouter {
    sink: Option<Weak<dyn NativeCallbackSink>>,
}

impl CallbackRouter {
    pub fn new(sink: Weak<dyn NativeCallbackSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Router that drops everything
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| s.strong_count() > 0)
    }

    /// Forward one callback. Returns `false` if nothing received it.
    pub fn deliver(&self, route: RouteKey, kind: NativeEventKind, payload: NativePayload) -> bool {
        match self.sink.as_ref().and_then(Weak::upgrade) {
            Some(sink) => {
                sink.deliver(route, kind, payload);
                true
            }
            None => {
                log::debug!("CallbackRouter: no bridge attached, dropping {} for {}", kind, route);
                false
            }
        }
    }

    pub fn on_load(&self, route: RouteKey, payload: NativePayload) -> bool {
        self.deliver(route, NativeEventKind::Load, payload)
    }

    pub fn on_show(&self, route: RouteKey, payload: NativePayload) -> bool {
        self.deliver(route, NativeEventKind::Show, payload)
    }

    pub fn on_click(&self, route: RouteKey, payload: NativePayload) -> bool {
        self.deliver(route, NativeEventKind::Click, payload)
    }

    pub fn on_close(&self, route: RouteKey, payload: NativePayload) -> bool {
        self.deliver(route, NativeEventKind::Close, payload)
    }

    pub fn on_expire(&self, route: RouteKey, payload: NativePayload) -> bool {
        self.deliver(route, NativeEventKind::Expire, payload)
    }

    pub fn on_impression(&self, route: RouteKey, payload: NativePayload) -> bool {
        self.deliver(route, NativeEventKind::Impression, payload)
    }

    pub fn on_reward(&self, route: RouteKey, payload: NativePayload) -> bool {
        self.deliver(route, NativeEventKind::Reward, payload)
    }

    pub fn on_win_bid(&self, route: RouteKey, payload: NativePayload) -> bool {
        self.deliver(route, NativeEventKind::WinBid, payload)
    }

    pub fn on_impression_data(&self, json: &str) -> bool {
        match self.sink.as_ref().and_then(Weak::upgrade) {
            Some(sink) => {
                sink.deliver_impression_level_revenue(json);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for CallbackRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRouter")
            .field("attached", &self.is_attached())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADAPTER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Native engine seam.
///
/// Implementations may invoke callbacks synchronously from inside `issue`;
/// the bridge never holds an instance lock while calling in.
pub trait PlatformAdapter: Send + Sync {
    fn platform_name(&self) -> &'static str;

    /// Create the native ad object for a placement
    fn create(
        &self,
        format: AdFormat,
        placement: &str,
        banner_size: Option<&BannerSize>,
    ) -> AdResult<NativeHandle>;

    fn issue(&self, request: NativeRequest<'_>) -> AdResult<IssueTicket>;

    fn load_routing(&self, _format: AdFormat) -> LoadRouting {
        LoadRouting::ByHandle
    }

    /// Called once by the bridge that owns this adapter
    fn subscribe_callbacks(&self, router: CallbackRouter);
}
