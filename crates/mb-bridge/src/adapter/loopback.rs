//! Loopback Adapter
//!
//! In-process engine: records every call and lets the host fire callbacks by
//! hand. Failures and load routing are scriptable per operation and format.

use super::{
    CallbackRouter, IssueTicket, LoadRouting, NativeOperation, NativeRequest, PlatformAdapter,
    RequestParams,
};
use mb_core::{AdError, AdFormat, AdResult, BannerSize, NativeHandle, RouteKey};
use mb_event::{NativeEventKind, NativePayload};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// One recorded `issue` call
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedCall {
    pub operation: NativeOperation,
    pub format: AdFormat,
    pub handle: NativeHandle,
    pub placement: String,
    pub params: RequestParams,
}

pub struct LoopbackAdapter {
    next_handle: AtomicU64,
    router: RwLock<CallbackRouter>,
    created: Mutex<Vec<(AdFormat, String, NativeHandle)>>,
    calls: Mutex<Vec<IssuedCall>>,
    failures: Mutex<HashMap<NativeOperation, AdError>>,
    create_failure: Mutex<Option<AdError>>,
    routing: RwLock<HashMap<AdFormat, LoadRouting>>,
    reused_handle: Mutex<Option<NativeHandle>>,
}

impl LoopbackAdapter {
    pub fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(0x1000),
            router: RwLock::new(CallbackRouter::detached()),
            created: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            create_failure: Mutex::new(None),
            routing: RwLock::new(HashMap::new()),
            reused_handle: Mutex::new(None),
        }
    }

    /// Route loads of `format` as the real engine for that format would
    pub fn set_load_routing(&self, format: AdFormat, routing: LoadRouting) {
        self.routing.write().insert(format, routing);
    }

    /// Make every `operation` fail synchronously until cleared
    pub fn fail_operation(&self, operation: NativeOperation, error: AdError) {
        self.failures.lock().insert(operation, error);
    }

    pub fn clear_failure(&self, operation: NativeOperation) {
        self.failures.lock().remove(&operation);
    }

    pub fn fail_create(&self, error: Option<AdError>) {
        *self.create_failure.lock() = error;
    }

    /// Hand out `handle` on the next `create`, as an engine recycling objects would
    pub fn reuse_handle_once(&self, handle: NativeHandle) {
        *self.reused_handle.lock() = Some(handle);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INSPECTION
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<IssuedCall> {
        self.calls.lock().clone()
    }

    pub fn issue_count(&self, operation: NativeOperation) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn total_issue_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_call(&self, operation: NativeOperation) -> Option<IssuedCall> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|c| c.operation == operation)
            .cloned()
    }

    /// Most recent handle created for `placement`
    pub fn handle_for(&self, format: AdFormat, placement: &str) -> Option<NativeHandle> {
        self.created
            .lock()
            .iter()
            .rev()
            .find(|(f, p, _)| *f == format && p == placement)
            .map(|(_, _, h)| *h)
    }

    pub fn is_attached(&self) -> bool {
        self.router.read().is_attached()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CALLBACKS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Fire a callback the way the engine would, from the calling thread
    pub fn fire(&self, route: RouteKey, kind: NativeEventKind, payload: NativePayload) -> bool {
        let router = self.router.read().clone();
        router.deliver(route, kind, payload)
    }

    pub fn fire_for_handle(
        &self,
        format: AdFormat,
        handle: NativeHandle,
        kind: NativeEventKind,
        payload: NativePayload,
    ) -> bool {
        self.fire(RouteKey::handle(format, handle), kind, payload)
    }

    /// Answer the most recent load with the route key it was issued on
    pub fn answer_last_load(&self, payload: NativePayload) -> bool {
        let Some(call) = self.last_call(NativeOperation::Load) else {
            log::warn!("LoopbackAdapter: no load to answer");
            return false;
        };
        let route = match call.params.correlation {
            Some(key) => RouteKey::Correlation(key),
            None => RouteKey::handle(call.format, call.handle),
        };
        self.fire(route, NativeEventKind::Load, payload)
    }

    pub fn fire_impression_data(&self, json: &str) -> bool {
        let router = self.router.read().clone();
        router.on_impression_data(json)
    }
}

impl Default for LoopbackAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformAdapter for LoopbackAdapter {
    fn platform_name(&self) -> &'static str {
        "loopback"
    }

    fn create(
        &self,
        format: AdFormat,
        placement: &str,
        _banner_size: Option<&BannerSize>,
    ) -> AdResult<NativeHandle> {
        if let Some(error) = self.create_failure.lock().clone() {
            return Err(error);
        }
        let handle = self
            .reused_handle
            .lock()
            .take()
            .unwrap_or_else(|| NativeHandle(self.next_handle.fetch_add(1, Ordering::Relaxed)));
        self.created
            .lock()
            .push((format, placement.to_string(), handle));
        log::debug!("LoopbackAdapter: created {} '{}' as {}", format, placement, handle);
        Ok(handle)
    }

    fn issue(&self, request: NativeRequest<'_>) -> AdResult<IssueTicket> {
        self.calls.lock().push(IssuedCall {
            operation: request.operation,
            format: request.format,
            handle: request.handle,
            placement: request.placement.to_string(),
            params: request.params.clone(),
        });

        if let Some(error) = self.failures.lock().get(&request.operation).cloned() {
            return Err(error);
        }

        Ok(match (request.operation, request.params.correlation) {
            (NativeOperation::Load, Some(key)) => IssueTicket::Correlation(key),
            (NativeOperation::Load | NativeOperation::Show, None) => IssueTicket::Handle(request.handle),
            _ => IssueTicket::Accepted,
        })
    }

    fn load_routing(&self, format: AdFormat) -> LoadRouting {
        self.routing
            .read()
            .get(&format)
            .copied()
            .unwrap_or_default()
    }

    fn subscribe_callbacks(&self, router: CallbackRouter) {
        *self.router.write() = router;
    }
}
