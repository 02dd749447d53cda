//! Settle-once cells and the `Request` future that observes them.
//!
//! A `Deferred<V>` moves from `Pending` to exactly one of `Fulfilled` or
//! `Rejected` and then never changes again. Settling an already settled cell
//! is a silent no-op; this is what lets `delete`/`clear` reject whatever cell
//! they find without checking whether a write got there first.
//!
//! Settlement happens synchronously inside the store's write path, but
//! observers only learn about it when their executor next polls them: waking
//! a task schedules it, it never runs it inline.

use crate::error::Rejection;
use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use std::rc::Rc;

enum State<V> {
    Pending(Vec<Waker>),
    Fulfilled(V),
    Rejected(Rejection),
}

pub(crate) struct Deferred<V> {
    state: RefCell<State<V>>,
}

impl<V: Clone> Deferred<V> {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(State::Pending(Vec::new())),
        })
    }

    pub(crate) fn is_settled(&self) -> bool {
        !matches!(*self.state.borrow(), State::Pending(_))
    }

    /// Returns false if the cell had already settled.
    pub(crate) fn fulfill(&self, value: V) -> bool {
        self.settle(State::Fulfilled(value))
    }

    /// Returns false if the cell had already settled.
    pub(crate) fn reject(&self, reason: Rejection) -> bool {
        self.settle(State::Rejected(reason))
    }

    fn settle(&self, outcome: State<V>) -> bool {
        let wakers = {
            let mut state = self.state.borrow_mut();
            if !matches!(*state, State::Pending(_)) {
                return false;
            }
            match core::mem::replace(&mut *state, outcome) {
                State::Pending(w) => w,
                _ => unreachable!(),
            }
        };
        // State borrow released before waking; a waker may poll inline.
        for w in wakers {
            w.wake();
        }
        true
    }

    fn outcome(&self) -> Option<Result<V, Rejection>> {
        match &*self.state.borrow() {
            State::Pending(_) => None,
            State::Fulfilled(v) => Some(Ok(v.clone())),
            State::Rejected(r) => Some(Err(*r)),
        }
    }

    fn poll_outcome(&self, cx: &mut Context<'_>) -> Poll<Result<V, Rejection>> {
        let mut state = self.state.borrow_mut();
        match &mut *state {
            State::Pending(wakers) => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
            State::Fulfilled(v) => Poll::Ready(Ok(v.clone())),
            State::Rejected(r) => Poll::Ready(Err(*r)),
        }
    }
}

/// A handle on the value a key will eventually hold.
///
/// Resolves to `Ok(value)` once the key is written, or `Err(Rejection)` if
/// the key is deleted or the store cleared first. Clones, and every
/// `request` for the same key issued before settlement, observe the same
/// cell and compare equal.
pub struct Request<V> {
    cell: Rc<Deferred<V>>,
}

impl<V: Clone> Request<V> {
    pub(crate) fn new(cell: Rc<Deferred<V>>) -> Self {
        Self { cell }
    }

    pub fn is_settled(&self) -> bool {
        self.cell.is_settled()
    }

    /// Outcome without waiting; `None` while still pending.
    pub fn peek(&self) -> Option<Result<V, Rejection>> {
        self.cell.outcome()
    }
}

impl<V> Clone for Request<V> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<V> PartialEq for Request<V> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<V> Eq for Request<V> {}

impl<V: Clone> core::fmt::Debug for Request<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = match &*self.cell.state.borrow() {
            State::Pending(_) => "pending",
            State::Fulfilled(_) => "fulfilled",
            State::Rejected(Rejection::Deleted) => "rejected(DELETED)",
            State::Rejected(Rejection::Cleared) => "rejected(CLEARED)",
        };
        f.debug_struct("Request")
            .field("cell", &Rc::as_ptr(&self.cell))
            .field("state", &state)
            .finish()
    }
}

impl<V: Clone> Future for Request<V> {
    type Output = Result<V, Rejection>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.cell.poll_outcome(cx)
    }
}
