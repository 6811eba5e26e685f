//! Pending requests and the futures callers await

use mb_core::{AdError, AdResult, CorrelationKey, LoadSuccess, ShowSuccess};
use mb_event::{Completion, CompletionFuture};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The single outstanding request of an instance
pub(crate) enum PendingRequest {
    Load {
        id: u64,
        completion: Completion<AdResult<LoadSuccess>>,
        /// Route key the answer must arrive on, when loads are correlation-routed
        correlation: Option<CorrelationKey>,
    },
    Show {
        id: u64,
        completion: Completion<AdResult<ShowSuccess>>,
    },
}

impl PendingRequest {
    pub(crate) fn id(&self) -> u64 {
        match self {
            PendingRequest::Load { id, .. } | PendingRequest::Show { id, .. } => *id,
        }
    }

    pub(crate) fn correlation(&self) -> Option<CorrelationKey> {
        match self {
            PendingRequest::Load { correlation, .. } => *correlation,
            PendingRequest::Show { .. } => None,
        }
    }

    pub(crate) fn is_load(&self) -> bool {
        matches!(self, PendingRequest::Load { .. })
    }

    /// Turn into a settlement that fails the caller with `error`
    pub(crate) fn into_failure(self, error: AdError) -> Settlement {
        match self {
            PendingRequest::Load { completion, .. } => Settlement::Load(completion, Err(error)),
            PendingRequest::Show { completion, .. } => Settlement::Show(completion, Err(error)),
        }
    }
}

/// A completion paired with its result, fired once the instance lock is released
pub(crate) enum Settlement {
    Load(Completion<AdResult<LoadSuccess>>, AdResult<LoadSuccess>),
    Show(Completion<AdResult<ShowSuccess>>, AdResult<ShowSuccess>),
}

impl Settlement {
    pub(crate) fn fire(self) {
        match self {
            Settlement::Load(completion, result) => {
                completion.complete(result);
            }
            Settlement::Show(completion, result) => {
                completion.complete(result);
            }
        }
    }
}

/// Outcome of a `load()` or `show()`.
///
/// The native request is issued when the operation is called, not when this
/// future is first polled. Dropping it does not cancel anything.
#[must_use = "the result of an ad request is only observable through this future"]
#[derive(Debug)]
pub struct AdFuture<T> {
    inner: CompletionFuture<AdResult<T>>,
}

impl<T> AdFuture<T> {
    pub(crate) fn new(inner: CompletionFuture<AdResult<T>>) -> Self {
        Self { inner }
    }

    /// Already-failed future for requests rejected before reaching the engine
    pub(crate) fn failed(error: AdError) -> Self {
        Self::new(CompletionFuture::ready(Err(error)))
    }
}

impl<T: Clone> AdFuture<T> {
    /// Take the result without waiting, if it has arrived.
    ///
    /// Repeated calls return the same result; the future can still be awaited.
    pub fn try_result(&mut self) -> Option<AdResult<T>> {
        self.inner
            .try_take()
            .map(|result| result.unwrap_or(Err(AdError::Destroyed)))
    }
}

impl<T: Clone> Future for AdFuture<T> {
    type Output = AdResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A completer can only vanish with its instance
        Pin::new(&mut self.inner)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(AdError::Destroyed)))
    }
}

pub type LoadFuture = AdFuture<LoadSuccess>;
pub type ShowFuture = AdFuture<ShowSuccess>;
