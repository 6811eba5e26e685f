//! Lifecycle states

use std::fmt;

/// Lifecycle state of one ad instance
///
/// ```text
/// Idle ──load──▶ Loading ──ok──▶ Loaded ──show──▶ Showing ──close/expire──▶ Finished
///  ▲               │ fail          ▲  │               │ fail                   │
///  └───────────────┘               └──┼───────────────┘                        │
///  ▲                                  └──────────close/expire──────────────────┤
///  └──────────────────────────────────load─────────────────────────────────────┘
///
/// any ──destroy──▶ Destroyed         any non-terminal ──clear_loaded──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Showing,
    Finished,
    Destroyed,
}

impl AdState {
    pub fn name(&self) -> &'static str {
        match self {
            AdState::Idle => "Idle",
            AdState::Loading => "Loading",
            AdState::Loaded => "Loaded",
            AdState::Showing => "Showing",
            AdState::Finished => "Finished",
            AdState::Destroyed => "Destroyed",
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, AdState::Destroyed)
    }

    /// States from which a publisher load may be issued
    #[inline]
    pub fn can_load(&self) -> bool {
        matches!(self, AdState::Idle | AdState::Finished)
    }

    #[inline]
    pub fn can_show(&self) -> bool {
        matches!(self, AdState::Loaded)
    }

    /// States a close or expire callback moves to `Finished`
    #[inline]
    pub(crate) fn is_presentable(&self) -> bool {
        matches!(self, AdState::Loaded | AdState::Showing)
    }
}

impl fmt::Display for AdState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
