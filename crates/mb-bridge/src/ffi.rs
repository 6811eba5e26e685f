//! C ABI callback entry points
//!
//! The native engine calls these from its own threads with the opaque context
//! pointer it was handed at setup. Every entry point:
//! - catches panics (nothing unwinds into native code)
//! - treats null, oversized or non-UTF-8 strings as empty
//! - returns 1 when the callback was accepted, 0 when it was rejected
//!
//! # Safety
//!
//! The context pointer must come from [`FfiCallbackContext::into_raw`] and
//! must not be used after [`mb_ffi_context_release`].

use crate::adapter::PlacementCallbacks;
use mb_core::AdFormat;
use mb_event::NativeEventKind;
use std::ffi::{CStr, c_char, c_void};
use std::sync::Arc;

/// Maximum accepted C string length (16KB); impression JSON is the largest
const MAX_FFI_STRING_LEN: usize = 16 * 1024;

/// Catch panics in FFI functions to prevent undefined behavior
macro_rules! ffi_panic_guard {
    ($default:expr, $body:expr) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(result) => result,
            Err(e) => {
                if let Some(s) = e.downcast_ref::<&str>() {
                    log::error!("FFI panic caught: {}", s);
                } else if let Some(s) = e.downcast_ref::<String>() {
                    log::error!("FFI panic caught: {}", s);
                } else {
                    log::error!("FFI panic caught (unknown type)");
                }
                $default
            }
        }
    };
}

// ═══════════════════════════════════════════════════════════════════════════
// CONTEXT
// ═══════════════════════════════════════════════════════════════════════════

/// What the engine's opaque context pointer points at
pub struct FfiCallbackContext {
    target: Arc<dyn PlacementCallbacks>,
}

impl FfiCallbackContext {
    /// Box a context for handing to native code
    pub fn into_raw(target: Arc<dyn PlacementCallbacks>) -> *mut c_void {
        Box::into_raw(Box::new(Self { target })) as *mut c_void
    }
}

/// # Safety
/// `ctx` must be null or a live pointer from [`FfiCallbackContext::into_raw`]
unsafe fn context<'a>(ctx: *mut c_void) -> Option<&'a FfiCallbackContext> {
    if ctx.is_null() {
        log::warn!("FFI callback with null context");
        return None;
    }
    unsafe { (ctx as *const FfiCallbackContext).as_ref() }
}

// ═══════════════════════════════════════════════════════════════════════════
// HELPER FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════

/// Convert C string to Rust string; anything unusable becomes empty
///
/// # Safety
/// - ptr must be a valid pointer to a null-terminated C string, or null
unsafe fn cstr_or_empty(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }

    // Find string length without reading past MAX_FFI_STRING_LEN
    let mut len = 0;
    unsafe {
        while len < MAX_FFI_STRING_LEN {
            if *ptr.add(len) == 0 {
                break;
            }
            len += 1;
        }
    }

    if len >= MAX_FFI_STRING_LEN {
        log::warn!("FFI string exceeds maximum length of {}", MAX_FFI_STRING_LEN);
        return String::new();
    }

    match unsafe { CStr::from_ptr(ptr) }.to_str() {
        Ok(s) => s.to_string(),
        Err(_) => {
            log::warn!("FFI string is not valid UTF-8");
            String::new()
        }
    }
}

#[inline]
fn decode_format(format: u8) -> Option<AdFormat> {
    match AdFormat::try_from(format) {
        Ok(f) => Some(f),
        Err(raw) => {
            log::warn!("FFI callback with unknown ad format {}", raw);
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════

/// Load finished for a placement. `code` 0 means filled.
///
/// # Safety
/// See the module documentation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mb_ffi_on_load_event(
    ctx: *mut c_void,
    format: u8,
    placement: *const c_char,
    load_id: *const c_char,
    metrics_json: *const c_char,
    code: i32,
    message: *const c_char,
) -> i32 {
    ffi_panic_guard!(0, {
        let Some(ctx) = (unsafe { context(ctx) }) else {
            return 0;
        };
        let Some(format) = decode_format(format) else {
            return 0;
        };
        let (placement, load_id, metrics_json, message) = unsafe {
            (
                cstr_or_empty(placement),
                cstr_or_empty(load_id),
                cstr_or_empty(metrics_json),
                cstr_or_empty(message),
            )
        };
        ctx.target
            .load_event(format, &placement, &load_id, &metrics_json, code, &message);
        1
    })
}

/// Generic placement event (`event` is a [`NativeEventKind`] discriminant)
///
/// # Safety
/// See the module documentation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mb_ffi_on_placement_event(
    ctx: *mut c_void,
    format: u8,
    event: u8,
    placement: *const c_char,
    code: i32,
    message: *const c_char,
) -> i32 {
    ffi_panic_guard!(0, {
        let Some(ctx) = (unsafe { context(ctx) }) else {
            return 0;
        };
        let Some(format) = decode_format(format) else {
            return 0;
        };
        let Ok(kind) = NativeEventKind::try_from(event) else {
            log::warn!("FFI callback with unknown event kind {}", event);
            return 0;
        };
        let (placement, message) = unsafe { (cstr_or_empty(placement), cstr_or_empty(message)) };
        ctx.target
            .placement_event(format, kind, &placement, code, &message);
        1
    })
}

/// # Safety
/// See the module documentation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mb_ffi_on_win_bid(
    ctx: *mut c_void,
    format: u8,
    placement: *const c_char,
    auction_id: *const c_char,
    partner_id: *const c_char,
    price: f64,
) -> i32 {
    ffi_panic_guard!(0, {
        let Some(ctx) = (unsafe { context(ctx) }) else {
            return 0;
        };
        let Some(format) = decode_format(format) else {
            return 0;
        };
        let (placement, auction_id, partner_id) = unsafe {
            (
                cstr_or_empty(placement),
                cstr_or_empty(auction_id),
                cstr_or_empty(partner_id),
            )
        };
        ctx.target
            .win_bid(format, &placement, &auction_id, &partner_id, price);
        1
    })
}

/// # Safety
/// See the module documentation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mb_ffi_on_reward(
    ctx: *mut c_void,
    placement: *const c_char,
    reward: i32,
) -> i32 {
    ffi_panic_guard!(0, {
        let Some(ctx) = (unsafe { context(ctx) }) else {
            return 0;
        };
        let placement = unsafe { cstr_or_empty(placement) };
        ctx.target.reward(&placement, reward);
        1
    })
}

/// # Safety
/// See the module documentation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mb_ffi_on_impression_data(ctx: *mut c_void, json: *const c_char) -> i32 {
    ffi_panic_guard!(0, {
        let Some(ctx) = (unsafe { context(ctx) }) else {
            return 0;
        };
        let json = unsafe { cstr_or_empty(json) };
        ctx.target.impression_data(&json);
        1
    })
}

/// Free a context. Null is ignored.
///
/// # Safety
/// `ctx` must not be used by any thread afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mb_ffi_context_release(ctx: *mut c_void) {
    ffi_panic_guard!((), {
        if !ctx.is_null() {
            drop(unsafe { Box::from_raw(ctx as *mut FfiCallbackContext) });
        }
    })
}
