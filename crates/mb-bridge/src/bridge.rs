//! Ad Bridge
//!
//! Composition root: owns the adapter, the identity registry and the
//! dispatcher, and creates ad instances wired to them. Nothing here is global;
//! two bridges in one process never see each other's callbacks.
//!
//! Handle/Shared split:
//! - `AdBridge` is the cheap cloneable handle the application keeps
//! - `BridgeShared` is what the adapter's callback router points at (weakly)

use crate::adapter::{CallbackRouter, NativeCallbackSink, PlatformAdapter};
use crate::instance::{AdInstance, InstanceDeps};
use crate::revenue::ImpressionLevelRevenue;
use mb_core::{
    AdError, AdFormat, AdResult, BannerSize, BridgeConfig, CorrelationKeyGenerator, MbResult,
    RouteKey,
};
use mb_event::{
    DispatchStats, EventDispatcher, IdentityRegistry, NativeEventKind, NativePayload,
    SubscriptionId, isolate,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Application callback for impression-level revenue data
pub type RevenueHandler = Arc<dyn Fn(&ImpressionLevelRevenue) + Send + Sync>;

struct BridgeShared {
    config: BridgeConfig,
    adapter: Arc<dyn PlatformAdapter>,
    registry: Arc<IdentityRegistry<AdInstance>>,
    dispatcher: EventDispatcher<AdInstance>,
    correlations: Arc<CorrelationKeyGenerator>,
    next_revenue_id: AtomicU64,
    revenue_handlers: RwLock<Vec<(SubscriptionId, RevenueHandler)>>,
}

impl NativeCallbackSink for BridgeShared {
    fn deliver(&self, route: RouteKey, kind: NativeEventKind, payload: NativePayload) {
        self.dispatcher.dispatch(&route, kind, &payload);
    }

    fn deliver_impression_level_revenue(&self, json: &str) {
        let Some(data) = ImpressionLevelRevenue::from_json_str(json) else {
            return;
        };
        let snapshot: Vec<RevenueHandler> = self
            .revenue_handlers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in snapshot {
            if !isolate("ILRD handler", || handler(&data)) {
                log::error!(
                    "{}: revenue handler for '{}' panicked",
                    self.config.log_tag,
                    data.placement
                );
            }
        }
    }
}

/// Entry point for creating ad instances
#[derive(Clone)]
pub struct AdBridge {
    shared: Arc<BridgeShared>,
}

impl AdBridge {
    /// Bridge with default configuration
    pub fn new(adapter: Arc<dyn PlatformAdapter>) -> Self {
        Self::build(adapter, BridgeConfig::default())
    }

    /// Bridge with validated configuration
    pub fn with_config(adapter: Arc<dyn PlatformAdapter>, config: BridgeConfig) -> MbResult<Self> {
        config.validate()?;
        Ok(Self::build(adapter, config))
    }

    fn build(adapter: Arc<dyn PlatformAdapter>, config: BridgeConfig) -> Self {
        let registry = Arc::new(IdentityRegistry::with_capacity(config.registry.initial_capacity));
        let dispatcher = EventDispatcher::new(Arc::clone(&registry))
            .with_log_dropped(config.dispatch.log_dropped_events);

        let shared = Arc::new(BridgeShared {
            config,
            adapter,
            registry,
            dispatcher,
            correlations: Arc::new(CorrelationKeyGenerator::new()),
            next_revenue_id: AtomicU64::new(1),
            revenue_handlers: RwLock::new(Vec::new()),
        });

        let weak: Weak<BridgeShared> = Arc::downgrade(&shared);
        shared.adapter.subscribe_callbacks(CallbackRouter::new(weak));
        log::info!(
            "{}: bridge ready on {} adapter",
            shared.config.log_tag,
            shared.adapter.platform_name()
        );

        Self { shared }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INSTANCE CREATION
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn interstitial(&self, placement: &str) -> AdResult<Arc<AdInstance>> {
        self.create(AdFormat::Interstitial, placement, None)
    }

    pub fn rewarded(&self, placement: &str) -> AdResult<Arc<AdInstance>> {
        self.create(AdFormat::Rewarded, placement, None)
    }

    pub fn banner(&self, placement: &str, size: BannerSize) -> AdResult<Arc<AdInstance>> {
        self.create(AdFormat::Banner, placement, Some(size))
    }

    fn create(
        &self,
        format: AdFormat,
        placement: &str,
        banner_size: Option<BannerSize>,
    ) -> AdResult<Arc<AdInstance>> {
        if placement.trim().is_empty() {
            return Err(AdError::InvalidPlacement(placement.to_string()));
        }

        let shared = &self.shared;
        let handle = shared
            .adapter
            .create(format, placement, banner_size.as_ref())?;
        if handle.is_null() {
            return Err(AdError::Adapter(format!(
                "{} adapter returned a null handle for {} '{}'",
                shared.adapter.platform_name(),
                format,
                placement
            )));
        }

        let deps = InstanceDeps {
            adapter: Arc::clone(&shared.adapter),
            registry: Arc::clone(&shared.registry),
            correlations: Arc::clone(&shared.correlations),
            keyword_limits: shared.config.keywords,
        };
        AdInstance::create(placement.to_string(), format, handle, banner_size, deps)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BRIDGE-WIDE EVENTS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn on_impression_level_revenue<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ImpressionLevelRevenue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.shared.next_revenue_id.fetch_add(1, Ordering::Relaxed));
        self.shared
            .revenue_handlers
            .write()
            .push((id, Arc::new(handler)));
        id
    }

    pub fn remove_revenue_handler(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.shared.revenue_handlers.write();
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTROSPECTION
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn stats(&self) -> DispatchStats {
        self.shared.dispatcher.stats()
    }

    pub fn registry(&self) -> &Arc<IdentityRegistry<AdInstance>> {
        &self.shared.registry
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.shared.config
    }

    pub fn platform_name(&self) -> &'static str {
        self.shared.adapter.platform_name()
    }

    /// Number of live tracked routes
    pub fn live_routes(&self) -> usize {
        self.shared.registry.purge_dead();
        self.shared.registry.len()
    }
}
