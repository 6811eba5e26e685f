//! Ad Lifecycle State Machine
//!
//! One `AdInstance` per placement object. The instance owns its state, keyword
//! map, result snapshots and its single pending request behind one mutex;
//! separate instances never contend.
//!
//! Locking rules:
//! - the adapter is never called while the instance mutex is held, because a
//!   native engine may answer synchronously from inside the call
//! - completions are fired and handlers run only after the mutex is released
//! - lock order is instance mutex → registry lock, never the reverse

use crate::adapter::{
    IssueTicket, LoadRouting, NativeOperation, NativeRequest, PlatformAdapter, RequestParams,
};
use crate::request::{AdFuture, LoadFuture, PendingRequest, Settlement, ShowFuture};
use crate::state::AdState;
use mb_core::{
    AdError, AdFormat, AdResult, BannerSize, BidInfo, CorrelationKey, CorrelationKeyGenerator,
    KeywordLimits, Keywords, LoadMetrics, LoadSuccess, NativeHandle, RouteKey, ShowSuccess,
};
use mb_event::{
    AdEvent, AdEventKind, Completion, DecodedPayload, EventHandler, EventTarget, HandlerSet,
    IdentityRegistry, NativeEventKind, Outcome, SubscriptionId,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Bridge-owned collaborators handed to every instance
#[derive(Clone)]
pub(crate) struct InstanceDeps {
    pub adapter: Arc<dyn PlatformAdapter>,
    pub registry: Arc<IdentityRegistry<AdInstance>>,
    pub correlations: Arc<CorrelationKeyGenerator>,
    pub keyword_limits: KeywordLimits,
}

#[derive(Default)]
struct InstanceCore {
    state: AdState,
    keywords: Keywords,
    custom_data: Option<String>,
    pending: Option<PendingRequest>,
    winning_bid: Option<BidInfo>,
    metrics: Option<LoadMetrics>,
    load_id: Option<String>,
    /// Win-bid reported before the load it belongs to completed
    stashed_bid: Option<BidInfo>,
}

impl InstanceCore {
    fn clear_snapshots(&mut self) {
        self.winning_bid = None;
        self.metrics = None;
        self.load_id = None;
        self.stashed_bid = None;
    }
}

/// Work left over once a transition has been applied under the lock
#[derive(Default)]
struct Effects {
    events: Vec<AdEvent>,
    settlement: Option<Settlement>,
    release: Option<CorrelationKey>,
}

pub struct AdInstance {
    placement: String,
    format: AdFormat,
    handle: NativeHandle,
    banner_size: Option<BannerSize>,
    core: Mutex<InstanceCore>,
    handlers: HandlerSet,
    adapter: Arc<dyn PlatformAdapter>,
    registry: Arc<IdentityRegistry<AdInstance>>,
    correlations: Arc<CorrelationKeyGenerator>,
    request_seq: AtomicU64,
    self_ref: Weak<AdInstance>,
}

impl AdInstance {
    /// Build an instance around an already-created native object and track it.
    ///
    /// Fails if another live instance already owns the handle.
    pub(crate) fn create(
        placement: String,
        format: AdFormat,
        handle: NativeHandle,
        banner_size: Option<BannerSize>,
        deps: InstanceDeps,
    ) -> AdResult<Arc<Self>> {
        let instance = Arc::new_cyclic(|weak| Self {
            placement,
            format,
            handle,
            banner_size,
            core: Mutex::new(InstanceCore {
                keywords: Keywords::with_limits(deps.keyword_limits),
                ..Default::default()
            }),
            handlers: HandlerSet::new(),
            adapter: deps.adapter,
            registry: deps.registry,
            correlations: deps.correlations,
            request_seq: AtomicU64::new(1),
            self_ref: weak.clone(),
        });

        if !instance.registry.track(instance.handle_route(), &instance) {
            // Leave the native object to its current owner
            instance.core.lock().state = AdState::Destroyed;
            return Err(AdError::Adapter(format!(
                "native handle {} for {} '{}' is already owned by a live instance",
                handle, format, instance.placement
            )));
        }

        log::debug!("AdInstance[{}]: created {} as {}", instance.placement, format, handle);
        Ok(instance)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn placement(&self) -> &str {
        &self.placement
    }

    pub fn format(&self) -> AdFormat {
        self.format
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub fn banner_size(&self) -> Option<&BannerSize> {
        self.banner_size.as_ref()
    }

    pub fn state(&self) -> AdState {
        self.core.lock().state
    }

    pub fn ready_to_show(&self) -> bool {
        self.core.lock().state.can_show()
    }

    pub fn has_pending_request(&self) -> bool {
        self.core.lock().pending.is_some()
    }

    /// Winning bid of the current load, if it succeeded
    pub fn winning_bid(&self) -> Option<BidInfo> {
        self.core.lock().winning_bid.clone()
    }

    pub fn load_metrics(&self) -> Option<LoadMetrics> {
        self.core.lock().metrics.clone()
    }

    pub fn load_id(&self) -> Option<String> {
        self.core.lock().load_id.clone()
    }

    pub fn keyword(&self, key: &str) -> Option<String> {
        self.core.lock().keywords.get(key).map(str::to_string)
    }

    pub fn keywords(&self) -> Keywords {
        self.core.lock().keywords.clone()
    }

    pub fn custom_data(&self) -> Option<String> {
        self.core.lock().custom_data.clone()
    }

    #[inline]
    fn handle_route(&self) -> RouteKey {
        RouteKey::handle(self.format, self.handle)
    }

    fn next_request_id(&self) -> u64 {
        self.request_seq.fetch_add(1, Ordering::Relaxed)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Request an ad. Legal from `Idle` and `Finished`.
    ///
    /// Rejections resolve immediately and never reach the engine.
    pub fn load(&self) -> LoadFuture {
        let routing = self.adapter.load_routing(self.format);
        let id = self.next_request_id();
        let (completion, future) = Completion::new();

        let params = {
            let mut core = self.core.lock();
            match core.state {
                AdState::Destroyed => return AdFuture::failed(AdError::InvalidInstance),
                AdState::Loading => return AdFuture::failed(AdError::LoadInProgress),
                AdState::Loaded | AdState::Showing => {
                    return AdFuture::failed(AdError::invalid_state("load", core.state));
                }
                AdState::Idle | AdState::Finished => {}
            }

            let correlation =
                (routing == LoadRouting::ByCorrelation).then(|| self.correlations.next_key());
            if let Some(key) = correlation {
                self.registry
                    .track_weak(RouteKey::Correlation(key), self.self_ref.clone());
            }

            core.state = AdState::Loading;
            core.clear_snapshots();
            core.pending = Some(PendingRequest::Load {
                id,
                completion,
                correlation,
            });
            RequestParams {
                keywords: core.keywords.to_pairs(),
                custom_data: None,
                banner_size: self.banner_size.clone(),
                correlation,
            }
        };

        log::debug!("AdInstance[{}]: load #{} issued", self.placement, id);
        self.issue(NativeOperation::Load, params, Some(id));
        AdFuture::new(future)
    }

    /// Present the loaded ad. Legal only from `Loaded`.
    pub fn show(&self) -> ShowFuture {
        let id = self.next_request_id();
        let (completion, future) = Completion::new();

        let params = {
            let mut core = self.core.lock();
            match core.state {
                AdState::Destroyed => return AdFuture::failed(AdError::InvalidInstance),
                AdState::Loaded => {}
                _ => return AdFuture::failed(AdError::NotReady),
            }
            core.state = AdState::Showing;
            core.pending = Some(PendingRequest::Show { id, completion });
            RequestParams {
                custom_data: core.custom_data.clone(),
                ..Default::default()
            }
        };

        log::debug!("AdInstance[{}]: show #{} issued", self.placement, id);
        self.issue(NativeOperation::Show, params, Some(id));
        AdFuture::new(future)
    }

    /// Returns `false` when the keyword exceeds the configured limits
    pub fn set_keyword(&self, key: &str, value: &str) -> bool {
        let mut core = self.core.lock();
        if core.state.is_terminal() {
            log::debug!("AdInstance[{}]: set_keyword on destroyed instance", self.placement);
            return false;
        }
        core.keywords.set(key, value)
    }

    /// Previous value, if the key was set
    pub fn remove_keyword(&self, key: &str) -> Option<String> {
        let mut core = self.core.lock();
        if core.state.is_terminal() {
            return None;
        }
        core.keywords.remove(key)
    }

    /// Opaque data forwarded to the engine with each show (fullscreen only)
    pub fn set_custom_data(&self, data: Option<String>) -> AdResult<()> {
        if !self.format.is_fullscreen() {
            return Err(AdError::Unsupported(format!(
                "custom data on {} ads",
                self.format
            )));
        }
        let mut core = self.core.lock();
        if core.state.is_terminal() {
            return Err(AdError::InvalidInstance);
        }
        core.custom_data = data;
        Ok(())
    }

    /// Discard any load result or outstanding request and return to `Idle`.
    ///
    /// An outstanding request resolves with [`AdError::Cleared`]; its late
    /// answer is dropped.
    pub fn clear_loaded(&self) -> AdResult<()> {
        let pending = {
            let mut core = self.core.lock();
            if core.state.is_terminal() {
                return Err(AdError::InvalidInstance);
            }
            core.state = AdState::Idle;
            core.clear_snapshots();
            core.pending.take()
        };

        if let Some(pending) = pending {
            self.discard(pending, AdError::Cleared);
        }
        self.issue(NativeOperation::ClearLoaded, RequestParams::default(), None);
        Ok(())
    }

    /// Release the native object and end the lifecycle.
    ///
    /// Every later operation fails with [`AdError::InvalidInstance`], including
    /// a second `destroy`.
    pub fn destroy(&self) -> AdResult<()> {
        let pending = {
            let mut core = self.core.lock();
            if core.state.is_terminal() {
                return Err(AdError::InvalidInstance);
            }
            core.state = AdState::Destroyed;
            core.clear_snapshots();
            core.pending.take()
        };

        self.registry.release_if_owner(&self.handle_route(), self);
        if let Some(pending) = pending {
            self.discard(pending, AdError::Destroyed);
        }
        // Handlers may capture this instance
        self.handlers.clear();
        self.issue(NativeOperation::Destroy, RequestParams::default(), None);
        log::debug!("AdInstance[{}]: destroyed", self.placement);
        Ok(())
    }

    /// Same as [`destroy`](Self::destroy)
    pub fn invalidate(&self) -> AdResult<()> {
        self.destroy()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SUBSCRIPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn subscribe(&self, kind: AdEventKind, handler: EventHandler) -> SubscriptionId {
        self.handlers.subscribe(kind, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.handlers.unsubscribe(id)
    }

    /// Publisher loads and engine refreshes alike
    pub fn on_did_load<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &AdResult<LoadSuccess>) + Send + Sync + 'static,
    {
        self.subscribe(
            AdEventKind::DidLoad,
            Arc::new(move |event| {
                if let AdEvent::DidLoad { placement, result, .. } = event {
                    handler(placement, result);
                }
            }),
        )
    }

    pub fn on_did_show<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &AdResult<ShowSuccess>) + Send + Sync + 'static,
    {
        self.subscribe(
            AdEventKind::DidShow,
            Arc::new(move |event| {
                if let AdEvent::DidShow { placement, result } = event {
                    handler(placement, result);
                }
            }),
        )
    }

    pub fn on_did_close<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str, Option<&AdError>) + Send + Sync + 'static,
    {
        self.subscribe(
            AdEventKind::DidClose,
            Arc::new(move |event| {
                if let AdEvent::DidClose { placement, error } = event {
                    handler(placement, error.as_ref());
                }
            }),
        )
    }

    pub fn on_did_click<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.subscribe(
            AdEventKind::DidClick,
            Arc::new(move |event| handler(event.placement())),
        )
    }

    pub fn on_did_record_impression<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.subscribe(
            AdEventKind::DidRecordImpression,
            Arc::new(move |event| handler(event.placement())),
        )
    }

    pub fn on_did_expire<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.subscribe(
            AdEventKind::DidExpire,
            Arc::new(move |event| handler(event.placement())),
        )
    }

    pub fn on_did_win_bid<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &BidInfo) + Send + Sync + 'static,
    {
        self.subscribe(
            AdEventKind::DidWinBid,
            Arc::new(move |event| {
                if let AdEvent::DidWinBid { placement, bid } = event {
                    handler(placement, bid);
                }
            }),
        )
    }

    /// Rewarded instances only
    pub fn on_did_receive_reward<F>(&self, handler: F) -> AdResult<SubscriptionId>
    where
        F: Fn(&str, i32) + Send + Sync + 'static,
    {
        if self.format != AdFormat::Rewarded {
            return Err(AdError::Unsupported(format!(
                "reward events on {} ads",
                self.format
            )));
        }
        Ok(self.subscribe(
            AdEventKind::DidReceiveReward,
            Arc::new(move |event| {
                if let AdEvent::DidReceiveReward { placement, reward } = event {
                    handler(placement, *reward);
                }
            }),
        ))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // NATIVE CALLS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Call the adapter. Must not be called with the instance mutex held.
    fn issue(&self, operation: NativeOperation, params: RequestParams, request_id: Option<u64>) {
        let expected = params.correlation;
        let request = NativeRequest {
            operation,
            format: self.format,
            handle: self.handle,
            placement: &self.placement,
            params,
        };

        match self.adapter.issue(request) {
            Ok(IssueTicket::Correlation(key)) if Some(key) != expected => {
                log::warn!(
                    "AdInstance[{}]: adapter answered {} with unexpected {}",
                    self.placement,
                    operation,
                    key
                );
            }
            Ok(IssueTicket::Handle(handle)) if handle != self.handle => {
                log::warn!(
                    "AdInstance[{}]: adapter answered {} on {} instead of {}",
                    self.placement,
                    operation,
                    handle,
                    self.handle
                );
            }
            Ok(_) => {}
            Err(error) => {
                log::warn!(
                    "AdInstance[{}]: {} rejected by {} adapter: {}",
                    self.placement,
                    operation,
                    self.adapter.platform_name(),
                    error
                );
                if let Some(id) = request_id {
                    self.abort_request(id, error);
                }
            }
        }
    }

    /// Roll back a request the adapter refused, unless it was already answered
    fn abort_request(&self, id: u64, error: AdError) {
        let pending = {
            let mut core = self.core.lock();
            let pending = core.pending.take_if(|p| p.id() == id);
            if let Some(pending) = &pending {
                core.state = if pending.is_load() {
                    AdState::Idle
                } else {
                    AdState::Loaded
                };
            }
            pending
        };

        if let Some(pending) = pending {
            self.discard(pending, error);
        }
    }

    /// Fail a request that no native answer will resolve anymore
    fn discard(&self, pending: PendingRequest, error: AdError) {
        if let Some(key) = pending.correlation() {
            self.registry
                .release_if_owner(&RouteKey::Correlation(key), self);
        }
        pending.into_failure(error).fire();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSITIONS
    // ═══════════════════════════════════════════════════════════════════════════

    fn apply_load(
        &self,
        core: &mut InstanceCore,
        route: &RouteKey,
        payload: &DecodedPayload,
        effects: &mut Effects,
    ) {
        let matches_pending = match &core.pending {
            Some(PendingRequest::Load {
                correlation: Some(key),
                ..
            }) => *route == RouteKey::Correlation(*key),
            Some(PendingRequest::Load {
                correlation: None, ..
            }) => true,
            _ => false,
        };

        if matches_pending {
            if let Some(PendingRequest::Load {
                completion,
                correlation,
                ..
            }) = core.pending.take()
            {
                let result = match &payload.outcome {
                    Outcome::Success => {
                        let bid = payload.bid.clone().or_else(|| core.stashed_bid.take());
                        core.state = AdState::Loaded;
                        core.stashed_bid = None;
                        core.winning_bid = bid.clone();
                        core.metrics = payload.metrics.clone();
                        core.load_id = payload.load_id.clone();
                        Ok(LoadSuccess {
                            load_id: payload.load_id.clone().unwrap_or_default(),
                            bid,
                            metrics: payload.metrics.clone(),
                        })
                    }
                    Outcome::Failure { code, message } => {
                        core.state = AdState::Idle;
                        core.clear_snapshots();
                        Err(AdError::native(*code, message.clone()))
                    }
                };

                effects.release = correlation;
                let filled = result.is_ok();
                effects.events.push(AdEvent::DidLoad {
                    placement: self.placement.clone(),
                    result: result.clone(),
                    autonomous: false,
                });
                if filled {
                    self.push_banner_shown(payload, effects);
                }
                effects.settlement = Some(Settlement::Load(completion, result));
            }
            return;
        }

        // Only banners refresh on their own; anything else is a stale answer
        if route.is_correlation() || self.format != AdFormat::Banner {
            log::debug!(
                "AdInstance[{}]: load answer on {} without a matching request, dropping",
                self.placement,
                route
            );
            return;
        }

        // Engine-initiated refresh: snapshots only, no state change
        let result = match &payload.outcome {
            Outcome::Success => {
                if let Some(bid) = &payload.bid {
                    core.winning_bid = Some(bid.clone());
                }
                if let Some(metrics) = &payload.metrics {
                    core.metrics = Some(metrics.clone());
                }
                if let Some(load_id) = &payload.load_id {
                    core.load_id = Some(load_id.clone());
                }
                Ok(LoadSuccess {
                    load_id: core.load_id.clone().unwrap_or_default(),
                    bid: core.winning_bid.clone(),
                    metrics: core.metrics.clone(),
                })
            }
            Outcome::Failure { code, message } => Err(AdError::native(*code, message.clone())),
        };
        log::debug!(
            "AdInstance[{}]: autonomous load ({}) while {}",
            self.placement,
            if result.is_ok() { "filled" } else { "failed" },
            core.state
        );
        let filled = result.is_ok();
        effects.events.push(AdEvent::DidLoad {
            placement: self.placement.clone(),
            result,
            autonomous: true,
        });
        if filled {
            self.push_banner_shown(payload, effects);
        }
    }

    /// A filled banner is on screen as soon as it loads; state is untouched
    fn push_banner_shown(&self, payload: &DecodedPayload, effects: &mut Effects) {
        if self.format != AdFormat::Banner {
            return;
        }
        effects.events.push(AdEvent::DidShow {
            placement: self.placement.clone(),
            result: Ok(ShowSuccess {
                metrics: payload.metrics.clone(),
            }),
        });
    }

    fn apply_show(&self, core: &mut InstanceCore, payload: &DecodedPayload, effects: &mut Effects) {
        let result = match &payload.outcome {
            Outcome::Success => Ok(ShowSuccess {
                metrics: payload.metrics.clone(),
            }),
            Outcome::Failure { code, message } => Err(AdError::native(*code, message.clone())),
        };

        let pending = core
            .pending
            .take_if(|p| matches!(p, PendingRequest::Show { .. }));
        match pending {
            Some(PendingRequest::Show { completion, .. }) => {
                if result.is_err() {
                    // Allow a retry
                    core.state = AdState::Loaded;
                }
                effects.settlement = Some(Settlement::Show(completion, result.clone()));
            }
            _ => {
                log::debug!(
                    "AdInstance[{}]: show callback without a pending show while {}",
                    self.placement,
                    core.state
                );
            }
        }

        effects.events.push(AdEvent::DidShow {
            placement: self.placement.clone(),
            result,
        });
    }

    /// Close and expire both end the presentation
    fn apply_finish(
        &self,
        core: &mut InstanceCore,
        kind: NativeEventKind,
        payload: &DecodedPayload,
        effects: &mut Effects,
    ) {
        let expired = kind == NativeEventKind::Expire;

        if core.state.is_presentable() {
            core.state = AdState::Finished;
            core.clear_snapshots();
        } else {
            log::debug!("AdInstance[{}]: {} while {}", self.placement, kind, core.state);
        }

        let pending = core
            .pending
            .take_if(|p| matches!(p, PendingRequest::Show { .. }));
        if let Some(PendingRequest::Show { completion, .. }) = pending {
            let result = if expired {
                Err(AdError::Expired)
            } else {
                Ok(ShowSuccess::default())
            };
            effects.settlement = Some(Settlement::Show(completion, result));
        }

        let placement = self.placement.clone();
        effects.events.push(if expired {
            AdEvent::DidExpire { placement }
        } else {
            let error = match &payload.outcome {
                Outcome::Success => None,
                Outcome::Failure { code, message } => Some(AdError::native(*code, message.clone())),
            };
            AdEvent::DidClose { placement, error }
        });
    }
}

impl EventTarget for AdInstance {
    fn apply_native_event(
        &self,
        route: &RouteKey,
        kind: NativeEventKind,
        payload: &DecodedPayload,
    ) -> Vec<AdEvent> {
        if !payload.placement.is_empty() && payload.placement != self.placement {
            log::warn!(
                "AdInstance[{}]: {} on {} names placement '{}', dropping",
                self.placement,
                kind,
                route,
                payload.placement
            );
            return Vec::new();
        }

        let mut effects = Effects::default();
        {
            let mut core = self.core.lock();
            if core.state.is_terminal() {
                log::debug!("AdInstance[{}]: {} after destroy, dropping", self.placement, kind);
                return Vec::new();
            }

            match kind {
                NativeEventKind::Load => self.apply_load(&mut core, route, payload, &mut effects),
                NativeEventKind::Show => self.apply_show(&mut core, payload, &mut effects),
                NativeEventKind::Close | NativeEventKind::Expire => {
                    self.apply_finish(&mut core, kind, payload, &mut effects)
                }
                NativeEventKind::Click => effects.events.push(AdEvent::DidClick {
                    placement: self.placement.clone(),
                }),
                NativeEventKind::Impression => effects.events.push(AdEvent::DidRecordImpression {
                    placement: self.placement.clone(),
                }),
                NativeEventKind::Reward => {
                    if self.format == AdFormat::Rewarded {
                        effects.events.push(AdEvent::DidReceiveReward {
                            placement: self.placement.clone(),
                            reward: payload.reward.unwrap_or(0),
                        });
                    } else {
                        log::warn!(
                            "AdInstance[{}]: reward for {} ad, dropping",
                            self.placement,
                            self.format
                        );
                    }
                }
                NativeEventKind::WinBid => {
                    let bid = payload.bid.clone().unwrap_or_default();
                    if core.state == AdState::Loading {
                        core.stashed_bid = Some(bid.clone());
                    }
                    effects.events.push(AdEvent::DidWinBid {
                        placement: self.placement.clone(),
                        bid,
                    });
                }
            }
        }

        if let Some(key) = effects.release {
            self.registry
                .release_if_owner(&RouteKey::Correlation(key), self);
        }
        if let Some(settlement) = effects.settlement {
            settlement.fire();
        }
        effects.events
    }

    fn handlers(&self) -> &HandlerSet {
        &self.handlers
    }
}

impl Drop for AdInstance {
    fn drop(&mut self) {
        let core = self.core.get_mut();
        if core.state.is_terminal() {
            return;
        }
        core.state = AdState::Destroyed;
        let pending = core.pending.take();

        self.registry.release_if_owner(&self.handle_route(), self);
        if let Some(pending) = pending {
            self.discard(pending, AdError::Destroyed);
        }
        self.issue(NativeOperation::Destroy, RequestParams::default(), None);
        log::debug!("AdInstance[{}]: released on drop", self.placement);
    }
}

impl fmt::Debug for AdInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdInstance")
            .field("placement", &self.placement)
            .field("format", &self.format)
            .field("handle", &self.handle)
            .field("state", &self.state())
            .finish()
    }
}
