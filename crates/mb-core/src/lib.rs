//! Mediation Bridge Core Types
//!
//! Shared vocabulary for the managed side of the ad mediation bridge:
//! - Native identities (`NativeHandle`, `CorrelationKey`, `RouteKey`)
//! - Ad formats and banner sizes
//! - Load/show result snapshots (`BidInfo`, `LoadMetrics`)
//! - Bounded keyword map
//! - Error taxonomy (`AdError` for ad operations, `MbError` for infrastructure)
//! - Bridge configuration

pub mod banner;
pub mod bid;
pub mod config;
pub mod error;
pub mod handle;
pub mod keywords;

pub use banner::BannerSize;
pub use bid::{BidInfo, LoadMetrics, LoadSuccess, ShowSuccess};
pub use config::{BridgeConfig, DispatchConfig, RegistryConfig};
pub use error::{AdError, AdResult, MbError, MbResult};
pub use handle::{AdFormat, CorrelationKey, CorrelationKeyGenerator, NativeHandle, RouteKey};
pub use keywords::{KeywordLimits, Keywords, MAX_KEY_CHARS, MAX_VALUE_CHARS};
