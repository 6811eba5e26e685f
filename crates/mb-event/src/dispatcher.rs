//! Event Dispatcher
//!
//! Entry point for every native callback. Runs on whatever thread the native
//! engine calls from:
//!
//! 1. decode the payload (never fails)
//! 2. resolve the route key to a live instance; unknown keys are dropped
//! 3. apply the state transition on the instance
//! 4. notify the instance's handlers with the resulting typed events
//!
//! No native callback can unwind past `dispatch`.

use crate::events::{AdEvent, NativeEventKind};
use crate::handlers::{HandlerSet, log_panic};
use crate::payload::{DecodedPayload, NativePayload};
use crate::registry::IdentityRegistry;
use mb_core::RouteKey;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Instance side of dispatch
pub trait EventTarget: Send + Sync {
    /// Apply a native callback and return the typed events to notify.
    ///
    /// Must not invoke handlers itself and must not hold internal locks once it
    /// returns.
    fn apply_native_event(
        &self,
        route: &RouteKey,
        kind: NativeEventKind,
        payload: &DecodedPayload,
    ) -> Vec<AdEvent>;

    fn handlers(&self) -> &HandlerSet;
}

/// What happened to one callback
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Delivered {
        events: Vec<AdEvent>,
        handler_panics: usize,
    },
    /// No live instance for the route key
    Dropped,
    /// The transition itself panicked; nothing was notified
    TargetPanicked,
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered { .. })
    }
}

/// Counters since creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub dispatched: u64,
    pub dropped: u64,
    pub handler_panics: u64,
    pub target_panics: u64,
}

pub struct EventDispatcher<T> {
    registry: Arc<IdentityRegistry<T>>,
    log_dropped: bool,
    dispatched: AtomicU64,
    dropped: AtomicU64,
    handler_panics: AtomicU64,
    target_panics: AtomicU64,
}

impl<T: EventTarget> EventDispatcher<T> {
    pub fn new(registry: Arc<IdentityRegistry<T>>) -> Self {
        Self {
            registry,
            log_dropped: true,
            dispatched: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            handler_panics: AtomicU64::new(0),
            target_panics: AtomicU64::new(0),
        }
    }

    /// Whether unresolvable callbacks are logged at warn level
    pub fn with_log_dropped(mut self, log_dropped: bool) -> Self {
        self.log_dropped = log_dropped;
        self
    }

    pub fn registry(&self) -> &Arc<IdentityRegistry<T>> {
        &self.registry
    }

    /// Route one native callback. Safe to call from any thread.
    pub fn dispatch(
        &self,
        route: &RouteKey,
        kind: NativeEventKind,
        payload: &NativePayload,
    ) -> DispatchOutcome {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        let decoded = payload.decode();

        let Some(target) = self.registry.resolve(route) else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            if self.log_dropped {
                log::warn!(
                    "dispatch: dropping {} for '{}': no live instance for {}",
                    kind,
                    decoded.placement,
                    route
                );
            } else {
                log::debug!("dispatch: dropping {} for {}", kind, route);
            }
            return DispatchOutcome::Dropped;
        };

        let applied = catch_unwind(AssertUnwindSafe(|| {
            target.apply_native_event(route, kind, &decoded)
        }));
        let events = match applied {
            Ok(events) => events,
            Err(payload) => {
                log_panic("dispatch", payload.as_ref());
                self.target_panics.fetch_add(1, Ordering::Relaxed);
                return DispatchOutcome::TargetPanicked;
            }
        };

        let mut handler_panics = 0;
        for event in &events {
            handler_panics += target.handlers().emit(event).panicked;
        }
        if handler_panics > 0 {
            self.handler_panics
                .fetch_add(handler_panics as u64, Ordering::Relaxed);
        }

        DispatchOutcome::Delivered {
            events,
            handler_panics,
        }
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            handler_panics: self.handler_panics.load(Ordering::Relaxed),
            target_panics: self.target_panics.load(Ordering::Relaxed),
        }
    }
}
