//! Handler Subscriptions
//!
//! Per-instance list of application callbacks. Emission snapshots the list and
//! releases the lock before invoking anything, so a handler may subscribe,
//! unsubscribe or call back into its instance. Each handler runs inside its
//! own panic boundary; one failing handler never stops the others.

use crate::events::{AdEvent, AdEventKind};
use parking_lot::RwLock;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Application callback
pub type EventHandler = Arc<dyn Fn(&AdEvent) + Send + Sync>;

/// Token returned by [`HandlerSet::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Result of one [`HandlerSet::emit`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    pub delivered: usize,
    pub panicked: usize,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PANIC BOUNDARY
// ═══════════════════════════════════════════════════════════════════════════════

/// Run `f`, catching and logging any panic. Returns `false` if it panicked.
pub fn isolate<F: FnOnce()>(label: &str, f: F) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            log_panic(label, payload.as_ref());
            false
        }
    }
}

pub(crate) fn log_panic(label: &str, payload: &(dyn Any + Send)) {
    if let Some(s) = payload.downcast_ref::<&str>() {
        log::error!("{}: panic caught: {}", label, s);
    } else if let Some(s) = payload.downcast_ref::<String>() {
        log::error!("{}: panic caught: {}", label, s);
    } else {
        log::error!("{}: panic caught (unknown type)", label);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HANDLER SET
// ═══════════════════════════════════════════════════════════════════════════════

pub struct HandlerSet {
    next_id: AtomicU64,
    handlers: RwLock<Vec<(SubscriptionId, AdEventKind, EventHandler)>>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Register `handler` for events of `kind`
    pub fn subscribe(&self, kind: AdEventKind, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, kind, handler));
        id
    }

    /// Returns `false` if `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(sub, _, _)| *sub != id);
        handlers.len() != before
    }

    pub fn clear(&self) {
        self.handlers.write().clear();
    }

    /// Number of handlers registered for `kind`
    pub fn count(&self, kind: AdEventKind) -> usize {
        self.handlers
            .read()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Invoke every handler subscribed to the event's kind, in subscription order
    pub fn emit(&self, event: &AdEvent) -> EmitReport {
        let kind = event.kind();
        let snapshot: Vec<EventHandler> = self
            .handlers
            .read()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, handler)| Arc::clone(handler))
            .collect();

        let mut report = EmitReport::default();
        for handler in snapshot {
            if isolate("handler", || handler(event)) {
                report.delivered += 1;
            } else {
                log::error!(
                    "handlers: {:?} handler for '{}' panicked",
                    kind,
                    event.placement()
                );
                report.panicked += 1;
            }
        }
        report
    }
}

impl Default for HandlerSet {
    fn default() -> Self {
        Self::new()
    }
}
