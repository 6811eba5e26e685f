//! Native and typed event kinds

use mb_core::{AdError, AdResult, BidInfo, LoadSuccess, ShowSuccess};
use std::fmt;

/// Callback kinds the native engine can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NativeEventKind {
    Load = 0,
    Show = 1,
    Click = 2,
    Close = 3,
    Expire = 4,
    Impression = 5,
    Reward = 6,
    WinBid = 7,
}

impl NativeEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            NativeEventKind::Load => "load",
            NativeEventKind::Show => "show",
            NativeEventKind::Click => "click",
            NativeEventKind::Close => "close",
            NativeEventKind::Expire => "expire",
            NativeEventKind::Impression => "impression",
            NativeEventKind::Reward => "reward",
            NativeEventKind::WinBid => "win-bid",
        }
    }
}

impl fmt::Display for NativeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for NativeEventKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => NativeEventKind::Load,
            1 => NativeEventKind::Show,
            2 => NativeEventKind::Click,
            3 => NativeEventKind::Close,
            4 => NativeEventKind::Expire,
            5 => NativeEventKind::Impression,
            6 => NativeEventKind::Reward,
            7 => NativeEventKind::WinBid,
            other => return Err(other),
        })
    }
}

/// Subscription categories for typed events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdEventKind {
    DidLoad,
    DidShow,
    DidClose,
    DidClick,
    DidRecordImpression,
    DidExpire,
    DidWinBid,
    DidReceiveReward,
}

/// Typed event delivered to application handlers
#[derive(Debug, Clone, PartialEq)]
pub enum AdEvent {
    /// A load finished. `autonomous` is set for engine-initiated refreshes.
    DidLoad {
        placement: String,
        result: AdResult<LoadSuccess>,
        autonomous: bool,
    },
    DidShow {
        placement: String,
        result: AdResult<ShowSuccess>,
    },
    DidClose {
        placement: String,
        error: Option<AdError>,
    },
    DidClick {
        placement: String,
    },
    DidRecordImpression {
        placement: String,
    },
    DidExpire {
        placement: String,
    },
    DidWinBid {
        placement: String,
        bid: BidInfo,
    },
    DidReceiveReward {
        placement: String,
        reward: i32,
    },
}

impl AdEvent {
    pub fn kind(&self) -> AdEventKind {
        match self {
            AdEvent::DidLoad { .. } => AdEventKind::DidLoad,
            AdEvent::DidShow { .. } => AdEventKind::DidShow,
            AdEvent::DidClose { .. } => AdEventKind::DidClose,
            AdEvent::DidClick { .. } => AdEventKind::DidClick,
            AdEvent::DidRecordImpression { .. } => AdEventKind::DidRecordImpression,
            AdEvent::DidExpire { .. } => AdEventKind::DidExpire,
            AdEvent::DidWinBid { .. } => AdEventKind::DidWinBid,
            AdEvent::DidReceiveReward { .. } => AdEventKind::DidReceiveReward,
        }
    }

    pub fn placement(&self) -> &str {
        match self {
            AdEvent::DidLoad { placement, .. }
            | AdEvent::DidShow { placement, .. }
            | AdEvent::DidClose { placement, .. }
            | AdEvent::DidClick { placement }
            | AdEvent::DidRecordImpression { placement }
            | AdEvent::DidExpire { placement }
            | AdEvent::DidWinBid { placement, .. }
            | AdEvent::DidReceiveReward { placement, .. } => placement,
        }
    }
}
