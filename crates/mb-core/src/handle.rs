//! Native identities and ad formats
//!
//! The native engine hands out opaque identities per ad object. They are only
//! unique among live objects of the same format, so callbacks are routed by a
//! `RouteKey` that pairs the handle with its format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// ═══════════════════════════════════════════════════════════════════════════════
// AD FORMAT
// ═══════════════════════════════════════════════════════════════════════════════

/// Ad format served for a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AdFormat {
    Interstitial = 0,
    Rewarded = 1,
    Banner = 2,
}

impl AdFormat {
    /// Fullscreen formats take over the screen when shown
    #[inline]
    pub fn is_fullscreen(&self) -> bool {
        matches!(self, AdFormat::Interstitial | AdFormat::Rewarded)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdFormat::Interstitial => "interstitial",
            AdFormat::Rewarded => "rewarded",
            AdFormat::Banner => "banner",
        }
    }
}

impl fmt::Display for AdFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for AdFormat {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AdFormat::Interstitial),
            1 => Ok(AdFormat::Rewarded),
            2 => Ok(AdFormat::Banner),
            other => Err(other),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NATIVE HANDLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Opaque identity assigned by the native engine to one ad object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NativeHandle(pub u64);

impl NativeHandle {
    /// The engine's "no object" value
    pub const NULL: NativeHandle = NativeHandle(0);

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Handle from a pointer-sized native address
    #[inline]
    pub fn from_address(address: usize) -> Self {
        Self(address as u64)
    }

    /// Handle from a 32-bit object hash code (sign bits preserved, not extended)
    #[inline]
    pub fn from_hash_code(hash_code: i32) -> Self {
        Self(hash_code as u32 as u64)
    }

    #[inline]
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CORRELATION KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Bridge-assigned key for requests that are routed without a native handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelationKey(pub u64);

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req#{}", self.0)
    }
}

/// Monotonic correlation key source, owned by one bridge
#[derive(Debug)]
pub struct CorrelationKeyGenerator {
    next: AtomicU64,
}

impl CorrelationKeyGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next key (never 0)
    #[inline]
    pub fn next_key(&self) -> CorrelationKey {
        CorrelationKey(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for CorrelationKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROUTE KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Key under which a native callback is routed to its ad instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKey {
    /// Callback names the native ad object
    Handle {
        format: AdFormat,
        handle: NativeHandle,
    },
    /// Callback names an in-flight request
    Correlation(CorrelationKey),
}

impl RouteKey {
    #[inline]
    pub fn handle(format: AdFormat, handle: NativeHandle) -> Self {
        RouteKey::Handle { format, handle }
    }

    #[inline]
    pub fn is_correlation(&self) -> bool {
        matches!(self, RouteKey::Correlation(_))
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKey::Handle { format, handle } => write!(f, "{}:{}", format, handle),
            RouteKey::Correlation(key) => write!(f, "{}", key),
        }
    }
}
