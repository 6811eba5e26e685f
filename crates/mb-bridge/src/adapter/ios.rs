//! iOS Adapter
//!
//! Drives an exported-function style engine through [`IosExterns`]. Ad objects
//! are raw pointers; callbacks name only the placement, so the adapter keeps a
//! `(format, placement) → handle` map to rebuild the route key. Callbacks for
//! placements it never created are dropped.
//!
//! The C entry points in [`crate::ffi`] call into [`PlacementCallbacks`].

use super::{CallbackRouter, IssueTicket, NativeOperation, NativeRequest, PlatformAdapter};
use mb_core::{AdError, AdFormat, AdResult, BannerSize, NativeHandle, RouteKey};
use mb_event::{NativeEventKind, NativePayload};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Exported engine functions. `ad` is the pointer returned by `get_ad`.
pub trait IosExterns: Send + Sync {
    /// Ad object pointer for a placement, 0 when the engine refused
    fn get_ad(&self, format: AdFormat, placement: &str, size: Option<&BannerSize>) -> usize;

    fn set_keyword(&self, ad: usize, key: &str, value: &str) -> bool;

    fn load(&self, ad: usize);

    fn show(&self, ad: usize, custom_data: Option<&str>);

    fn clear_loaded(&self, ad: usize) -> bool;

    fn free(&self, ad: usize);
}

/// Placement-keyed callbacks as the engine raises them
pub trait PlacementCallbacks: Send + Sync {
    fn load_event(
        &self,
        format: AdFormat,
        placement: &str,
        load_id: &str,
        metrics_json: &str,
        code: i32,
        message: &str,
    );

    fn placement_event(
        &self,
        format: AdFormat,
        kind: NativeEventKind,
        placement: &str,
        code: i32,
        message: &str,
    );

    fn win_bid(
        &self,
        format: AdFormat,
        placement: &str,
        auction_id: &str,
        partner_id: &str,
        price: f64,
    );

    fn reward(&self, placement: &str, reward: i32);

    fn impression_data(&self, json: &str);
}

pub struct IosAdapter<E: IosExterns> {
    externs: E,
    router: RwLock<CallbackRouter>,
    handles: RwLock<HashMap<(AdFormat, String), NativeHandle>>,
}

impl<E: IosExterns> IosAdapter<E> {
    pub fn new(externs: E) -> Self {
        Self {
            externs,
            router: RwLock::new(CallbackRouter::detached()),
            handles: RwLock::new(HashMap::new()),
        }
    }

    pub fn externs(&self) -> &E {
        &self.externs
    }

    fn route_for(&self, format: AdFormat, placement: &str) -> Option<RouteKey> {
        let handle = self
            .handles
            .read()
            .get(&(format, placement.to_string()))
            .copied();
        if handle.is_none() {
            log::warn!(
                "IosAdapter: callback for unknown {} placement '{}', dropping",
                format,
                placement
            );
        }
        handle.map(|h| RouteKey::handle(format, h))
    }

    fn deliver(&self, format: AdFormat, kind: NativeEventKind, payload: NativePayload) {
        if let Some(route) = self.route_for(format, &payload.placement) {
            let router = self.router.read().clone();
            router.deliver(route, kind, payload);
        }
    }
}

impl<E: IosExterns> PlacementCallbacks for IosAdapter<E> {
    fn load_event(
        &self,
        format: AdFormat,
        placement: &str,
        load_id: &str,
        metrics_json: &str,
        code: i32,
        message: &str,
    ) {
        let mut payload = NativePayload::new(placement)
            .with_error(code, message)
            .with_load_id(load_id);
        if !metrics_json.is_empty() {
            payload = payload.with_metrics_json(metrics_json);
        }
        self.deliver(format, NativeEventKind::Load, payload);
    }

    fn placement_event(
        &self,
        format: AdFormat,
        kind: NativeEventKind,
        placement: &str,
        code: i32,
        message: &str,
    ) {
        self.deliver(format, kind, NativePayload::new(placement).with_error(code, message));
    }

    fn win_bid(
        &self,
        format: AdFormat,
        placement: &str,
        auction_id: &str,
        partner_id: &str,
        price: f64,
    ) {
        let payload = NativePayload::new(placement).with_bid(auction_id, partner_id, price);
        self.deliver(format, NativeEventKind::WinBid, payload);
    }

    fn reward(&self, placement: &str, reward: i32) {
        let payload = NativePayload::new(placement).with_reward(reward);
        self.deliver(AdFormat::Rewarded, NativeEventKind::Reward, payload);
    }

    fn impression_data(&self, json: &str) {
        let router = self.router.read().clone();
        router.on_impression_data(json);
    }
}

impl<E: IosExterns> PlatformAdapter for IosAdapter<E> {
    fn platform_name(&self) -> &'static str {
        "ios"
    }

    fn create(
        &self,
        format: AdFormat,
        placement: &str,
        banner_size: Option<&BannerSize>,
    ) -> AdResult<NativeHandle> {
        let handle = NativeHandle::from_address(self.externs.get_ad(format, placement, banner_size));
        if handle.is_null() {
            return Err(AdError::InvalidPlacement(placement.to_string()));
        }
        let previous = self
            .handles
            .write()
            .insert((format, placement.to_string()), handle);
        if let Some(previous) = previous.filter(|p| *p != handle) {
            log::warn!(
                "IosAdapter: {} '{}' now routes to {} (was {}); callbacks cannot tell them apart",
                format,
                placement,
                handle,
                previous
            );
        }
        Ok(handle)
    }

    fn issue(&self, request: NativeRequest<'_>) -> AdResult<IssueTicket> {
        let ad = request.handle.raw() as usize;

        match request.operation {
            NativeOperation::Load => {
                for (key, value) in &request.params.keywords {
                    if !self.externs.set_keyword(ad, key, value) {
                        log::warn!("IosAdapter: engine rejected keyword '{}'", key);
                    }
                }
                self.externs.load(ad);
                Ok(IssueTicket::Handle(request.handle))
            }
            NativeOperation::Show => {
                if request.format == AdFormat::Banner {
                    return Err(AdError::Unsupported(
                        "banners are displayed when loaded".to_string(),
                    ));
                }
                self.externs
                    .show(ad, request.params.custom_data.as_deref());
                Ok(IssueTicket::Handle(request.handle))
            }
            NativeOperation::ClearLoaded => {
                if !self.externs.clear_loaded(ad) {
                    log::debug!("IosAdapter: nothing to clear for '{}'", request.placement);
                }
                Ok(IssueTicket::Accepted)
            }
            NativeOperation::Destroy => {
                let key = (request.format, request.placement.to_string());
                let mut handles = self.handles.write();
                if handles.get(&key) == Some(&request.handle) {
                    handles.remove(&key);
                }
                drop(handles);
                self.externs.free(ad);
                Ok(IssueTicket::Accepted)
            }
        }
    }

    fn subscribe_callbacks(&self, router: CallbackRouter) {
        *self.router.write() = router;
    }
}
