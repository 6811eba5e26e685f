//! Mediation Bridge Callback Plumbing
//!
//! Everything between a raw native callback and a typed application event:
//! - `IdentityRegistry`: route key → live instance (non-owning)
//! - `Completion`: single-assignment result bridging a callback to an awaiting caller
//! - `NativePayload`: tolerant decoding of untyped callback fields
//! - `HandlerSet`: per-instance subscriptions, invoked inside a panic boundary
//! - `EventDispatcher`: decode → resolve → apply → notify
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Native thread (any)                                             │
//! │  ┌───────────────┐   RouteKey    ┌───────────────────┐           │
//! │  │ NativePayload │──────────────▶│ EventDispatcher   │           │
//! │  └───────────────┘               │  .dispatch()      │           │
//! │                                  └─────────┬─────────┘           │
//! │                     resolve (Weak → Arc)   │                     │
//! │  ┌───────────────────┐◀────────────────────┘                     │
//! │  │ IdentityRegistry  │                                           │
//! │  └───────────────────┘      apply transition    ┌─────────────┐  │
//! │                          ┌─────────────────────▶│ EventTarget │  │
//! │                          │                      └──────┬──────┘  │
//! │                          │  typed AdEvents             │         │
//! │                          └──── HandlerSet::emit ◀──────┘         │
//! │                                (catch_unwind per handler)        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod completion;
pub mod dispatcher;
pub mod events;
pub mod handlers;
pub mod payload;
pub mod registry;

pub use completion::{Completion, CompletionDropped, CompletionFuture};
pub use dispatcher::{DispatchOutcome, DispatchStats, EventDispatcher, EventTarget};
pub use events::{AdEvent, AdEventKind, NativeEventKind};
pub use handlers::{EmitReport, EventHandler, HandlerSet, SubscriptionId, isolate};
pub use payload::{DecodedPayload, NativePayload, Outcome, PriceField, parse_price};
pub use registry::IdentityRegistry;
