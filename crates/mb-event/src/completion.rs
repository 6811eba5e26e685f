//! Completion Primitive
//!
//! Single-assignment result slot bridging a native callback to an awaiting
//! caller. Created before the native request is issued, resolved at most once
//! by whoever sees the answer first, awaited as an ordinary `Future`.
//!
//! There is no timeout and no cancellation: the native engine cannot cancel a
//! request, so a caller that stops awaiting simply never observes the value.

use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::oneshot;

/// Every completer was dropped without resolving
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("completion dropped without a result")]
pub struct CompletionDropped;

/// Resolving side. Cloneable; only the first `complete` wins.
pub struct Completion<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Completion<T> {
    /// Create an unresolved completion and the future observing it
    pub fn new() -> (Self, CompletionFuture<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                slot: Arc::new(Mutex::new(Some(tx))),
            },
            CompletionFuture {
                state: FutureState::Waiting(rx),
            },
        )
    }

    /// Deliver the result.
    ///
    /// Returns `false` (and logs) if the completion was already resolved; the
    /// earlier result stands.
    pub fn complete(&self, value: T) -> bool {
        let sender = self.slot.lock().take();
        match sender {
            Some(tx) => {
                if tx.send(value).is_err() {
                    log::debug!("completion: awaiting side is gone, result dropped");
                }
                true
            }
            None => {
                log::warn!("completion: already resolved, ignoring second result");
                false
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.lock().is_none()
    }
}

/// Awaiting side of a [`Completion`].
///
/// Once the value has been observed it is kept, so `try_take` and `poll` keep
/// returning it instead of touching the spent channel.
#[derive(Debug)]
pub struct CompletionFuture<T> {
    state: FutureState<T>,
}

#[derive(Debug)]
enum FutureState<T> {
    Waiting(oneshot::Receiver<T>),
    Settled(Result<T, CompletionDropped>),
}

// The value is never pinned in place
impl<T> Unpin for CompletionFuture<T> {}

impl<T> CompletionFuture<T> {
    /// A future that is already resolved with `value`
    pub fn ready(value: T) -> Self {
        Self {
            state: FutureState::Settled(Ok(value)),
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, FutureState::Settled(_))
    }
}

impl<T: Clone> CompletionFuture<T> {
    /// Take the result without waiting, if it has arrived
    pub fn try_take(&mut self) -> Option<Result<T, CompletionDropped>> {
        if let FutureState::Waiting(rx) = &mut self.state {
            let settled = match rx.try_recv() {
                Ok(value) => Ok(value),
                Err(oneshot::error::TryRecvError::Empty) => return None,
                Err(oneshot::error::TryRecvError::Closed) => Err(CompletionDropped),
            };
            self.state = FutureState::Settled(settled);
        }
        match &self.state {
            FutureState::Settled(result) => Some(result.clone()),
            FutureState::Waiting(_) => None,
        }
    }
}

impl<T: Clone> Future for CompletionFuture<T> {
    type Output = Result<T, CompletionDropped>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        if let FutureState::Waiting(rx) = &mut this.state {
            let settled = match Pin::new(rx).poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(result) => result.map_err(|_| CompletionDropped),
            };
            this.state = FutureState::Settled(settled);
        }
        match &this.state {
            FutureState::Settled(result) => Poll::Ready(result.clone()),
            FutureState::Waiting(_) => Poll::Pending,
        }
    }
}
