#![forbid(unsafe_code)]

//! Animation-complete handles.
//!
//! Every animated move returns a [`SwipeCompletion`]. The handle resolves when
//! the host clock passes the end of the transition (see
//! [`GestureCarousel::advance`](crate::carousel::GestureCarousel::advance)),
//! when a newer move supersedes it, or when the caller cancels it.
//!
//! The handle is a [`Future`], so async hosts can `.await` it; synchronous
//! hosts poll [`SwipeCompletion::outcome`].
//!
//! # Invariants
//!
//! 1. An outcome is set at most once; later resolutions are ignored.
//! 2. The post-swipe callback runs only for [`CompletionOutcome::Completed`].

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// How a move's completion resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionOutcome {
    /// The transition ran its full duration.
    Completed,
    /// A newer gesture or move replaced this one before it finished.
    Superseded,
    /// The caller cancelled, or the carousel was unloaded.
    Cancelled,
}

#[derive(Debug, Default)]
struct CompletionShared {
    outcome: Cell<Option<CompletionOutcome>>,
    waker: RefCell<Option<Waker>>,
}

/// Handle to one pending or finished move.
#[derive(Debug, Clone)]
pub struct SwipeCompletion {
    shared: Rc<CompletionShared>,
}

impl SwipeCompletion {
    pub(crate) fn pending() -> Self {
        Self {
            shared: Rc::new(CompletionShared::default()),
        }
    }

    pub(crate) fn finished(outcome: CompletionOutcome) -> Self {
        let completion = Self::pending();
        completion.resolve(outcome);
        completion
    }

    /// Resolve if still pending. Returns whether this call set the outcome.
    pub(crate) fn resolve(&self, outcome: CompletionOutcome) -> bool {
        if self.shared.outcome.get().is_some() {
            return false;
        }
        self.shared.outcome.set(Some(outcome));
        if let Some(waker) = self.shared.waker.borrow_mut().take() {
            waker.wake();
        }
        true
    }

    /// Outcome, or `None` while the transition is running.
    #[must_use]
    pub fn outcome(&self) -> Option<CompletionOutcome> {
        self.shared.outcome.get()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.outcome().is_none()
    }

    /// Drop interest in this move. The post-swipe callback will not run for
    /// it. Returns `false` if it had already resolved.
    pub fn cancel(&self) -> bool {
        self.resolve(CompletionOutcome::Cancelled)
    }

    /// Whether `other` refers to the same move.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Future for SwipeCompletion {
    type Output = CompletionOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.shared.outcome.get() {
            Some(outcome) => Poll::Ready(outcome),
            None => {
                *self.shared.waker.borrow_mut() = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_once(completion: &mut SwipeCompletion) -> Poll<CompletionOutcome> {
        let mut cx = Context::from_waker(Waker::noop());
        Pin::new(completion).poll(&mut cx)
    }

    #[test]
    fn pending_until_resolved() {
        let mut completion = SwipeCompletion::pending();
        assert!(completion.is_pending());
        assert_eq!(poll_once(&mut completion), Poll::Pending);
        assert!(completion.resolve(CompletionOutcome::Completed));
        assert_eq!(
            poll_once(&mut completion),
            Poll::Ready(CompletionOutcome::Completed)
        );
    }

    #[test]
    fn first_resolution_wins() {
        let completion = SwipeCompletion::pending();
        let observer = completion.clone();
        assert!(observer.cancel());
        assert!(!completion.resolve(CompletionOutcome::Completed));
        assert_eq!(completion.outcome(), Some(CompletionOutcome::Cancelled));
        assert!(!observer.cancel());
    }

    #[test]
    fn finished_handle_is_ready() {
        let completion = SwipeCompletion::finished(CompletionOutcome::Completed);
        assert!(!completion.is_pending());
        assert!(completion.same_as(&completion.clone()));
        assert!(!completion.same_as(&SwipeCompletion::pending()));
    }
}
