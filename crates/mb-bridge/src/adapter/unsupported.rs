//! Unsupported Adapter
//!
//! For hosts with no native engine. Instances can be created so application
//! code runs unchanged, but every request fails.

use super::{CallbackRouter, IssueTicket, NativeRequest, PlatformAdapter};
use mb_core::{AdError, AdFormat, AdResult, BannerSize, NativeHandle};
use std::sync::atomic::{AtomicU64, Ordering};

pub struct UnsupportedAdapter {
    next_handle: AtomicU64,
}

impl UnsupportedAdapter {
    pub fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(1),
        }
    }
}

impl Default for UnsupportedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformAdapter for UnsupportedAdapter {
    fn platform_name(&self) -> &'static str {
        "unsupported"
    }

    fn create(
        &self,
        format: AdFormat,
        placement: &str,
        _banner_size: Option<&BannerSize>,
    ) -> AdResult<NativeHandle> {
        log::debug!(
            "UnsupportedAdapter: {} '{}' created without a native engine",
            format,
            placement
        );
        Ok(NativeHandle(self.next_handle.fetch_add(1, Ordering::Relaxed)))
    }

    fn issue(&self, request: NativeRequest<'_>) -> AdResult<IssueTicket> {
        Err(AdError::Unsupported(format!(
            "{} for {} '{}' on this platform",
            request.operation, request.format, request.placement
        )))
    }

    fn subscribe_callbacks(&self, _router: CallbackRouter) {}
}
