/*
 * Copyright 2019 OysterPack Inc.
 *
 *    Licensed under the Apache License, Version 2.0 (the "License");
 *    you may not use this file except in compliance with the License.
 *    You may obtain a copy of the License at
 *
 *        http://www.apache.org/licenses/LICENSE-2.0
 *
 *    Unless required by applicable law or agreed to in writing, software
 *    distributed under the License is distributed on an "AS IS" BASIS,
 *    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *    See the License for the specific language governing permissions and
 *    limitations under the License.
 */

//! A [Promise](struct.Promise.html) is a write-once cell for an eventual value or failure.
//!
//! ## State machine
//! ```text
//!            complete(value)
//!          +----------------> Completed
//! Pending -+
//!          +----------------> Failed
//!          complete_exceptionally(failure)
//! ```
//! - once settled, the promise never changes state again. Concurrent settle attempts are
//!   serialized by the promise lock - the first one wins and the rest are ignored.
//! - continuations registered while pending are run exactly once, by the thread that settles the
//!   promise, in registration order. Continuations registered after the promise is settled are run
//!   immediately on the registering thread.
//! - the promise is shared by the producer and any number of consumers. Its lifetime is that of the
//!   longest holder.
//!
//! Consumers can block on [get()](struct.Promise.html#method.get), or `.await` the promise from an
//! async context. Polling [is_done()](struct.Promise.html#method.is_done) in a loop is an
//! anti-pattern - use blocking retrieval or register a continuation instead.

use crate::errors::{ExecutionError, TaskFailure};
use parking_lot::{Condvar, Mutex};
use std::{
    cell::RefCell,
    collections::VecDeque,
    fmt,
    future::Future,
    mem,
    panic::{catch_unwind, AssertUnwindSafe},
    pin::Pin,
    sync::Arc,
    task::{Context, Poll, Waker},
    time::{Duration, Instant},
};
use vow_log::*;

type Deferred = Box<dyn FnOnce()>;

thread_local! {
    // continuations queued by settles nested inside a running continuation on this thread
    static DEFERRED: RefCell<Option<VecDeque<Deferred>>> = RefCell::new(None);
}

/// Runs the continuations on the current thread, unless this thread is already draining
/// continuations, in which case they are queued behind the ones already pending.
fn run_deferred<I: IntoIterator<Item = Deferred>>(continuations: I) {
    let outermost = DEFERRED.with(|deferred| {
        let mut deferred = deferred.borrow_mut();
        let outermost = deferred.is_none();
        deferred
            .get_or_insert_with(VecDeque::new)
            .extend(continuations);
        outermost
    });
    if !outermost {
        return;
    }
    while let Some(continuation) =
        DEFERRED.with(|deferred| deferred.borrow_mut().as_mut().and_then(VecDeque::pop_front))
    {
        if catch_unwind(AssertUnwindSafe(continuation)).is_err() {
            error!("a promise continuation panicked");
        }
    }
    DEFERRED.with(|deferred| *deferred.borrow_mut() = None);
}

/// A settled promise either holds the value, or the failure
pub type Outcome<T> = Result<T, TaskFailure>;

type Continuation<T> = Box<dyn FnOnce(&Outcome<T>) + Send + 'static>;

/// Promise state, as observed at a point in time
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PromiseState {
    /// not yet settled
    Pending,
    /// settled with a value
    Completed,
    /// settled with a failure
    Failed,
}

/// A write-once container for an eventual value or failure.
///
/// The promise is a clonable handle: clones refer to the same cell. The settled outcome is shared
/// by reference between all holders, thus a promise can only cross threads if `T: Send + Sync`.
///
/// ```rust
/// # use vow::Promise;
/// let promise = Promise::new();
/// assert!(!promise.is_done());
/// assert!(promise.complete(1));
/// // write-once: the second completion is ignored
/// assert!(!promise.complete(2));
/// assert_eq!(promise.get().unwrap(), 1);
/// ```
pub struct Promise<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    settled: Condvar,
}

enum State<T> {
    Pending {
        continuations: Vec<Continuation<T>>,
        wakers: Vec<Waker>,
    },
    Settled(Arc<Outcome<T>>),
}

impl<T> Promise<T> {
    /// Creates a pending promise
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::Pending {
                    continuations: Vec::new(),
                    wakers: Vec::new(),
                }),
                settled: Condvar::new(),
            }),
        }
    }

    /// Non-blocking state snapshot. The state may be stale the instant after it is returned.
    pub fn state(&self) -> PromiseState {
        match &*self.inner.state.lock() {
            State::Pending { .. } => PromiseState::Pending,
            State::Settled(outcome) => match **outcome {
                Ok(_) => PromiseState::Completed,
                Err(_) => PromiseState::Failed,
            },
        }
    }

    /// Returns true if the promise has been settled, either with a value or a failure.
    pub fn is_done(&self) -> bool {
        self.state() != PromiseState::Pending
    }

    /// Returns true if the promise has been settled with a failure
    pub fn is_completed_exceptionally(&self) -> bool {
        self.state() == PromiseState::Failed
    }

    /// Blocks the calling thread until the promise is settled, without retrieving the outcome.
    pub fn wait(&self) {
        let mut state = self.inner.state.lock();
        while let State::Pending { .. } = *state {
            self.inner.settled.wait(&mut state);
        }
    }

    /// Blocks the calling thread until the promise is settled, or the timeout expires.
    ///
    /// Returns true if the promise is settled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => {
                // the deadline is beyond what the clock can represent
                self.wait();
                return true;
            }
        };
        let mut state = self.inner.state.lock();
        while let State::Pending { .. } = *state {
            if self
                .inner
                .settled
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return match *state {
                    State::Pending { .. } => false,
                    State::Settled(_) => true,
                };
            }
        }
        true
    }
}

impl<T: 'static> Promise<T> {
    /// Creates a promise that is already completed with the specified value
    pub fn completed(value: T) -> Self {
        Self::settled(Ok(value))
    }

    /// Creates a promise that is already completed with the specified failure
    pub fn failed<F: Into<TaskFailure>>(failure: F) -> Self {
        Self::settled(Err(failure.into()))
    }

    fn settled(outcome: Outcome<T>) -> Self {
        let promise = Self::new();
        promise.settle(outcome);
        promise
    }

    /// Completes the promise with the specified value.
    ///
    /// Returns false if the promise was already settled, in which case the value is discarded.
    pub fn complete(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Completes the promise with the specified failure.
    ///
    /// Returns false if the promise was already settled, in which case the failure is discarded.
    pub fn complete_exceptionally<F: Into<TaskFailure>>(&self, failure: F) -> bool {
        self.settle(Err(failure.into()))
    }

    /// Settles the promise. Only the first settle wins.
    ///
    /// Blocked waiters and wakers are notified first, then the continuations run on this thread.
    /// When this settle is itself triggered by a continuation, the continuations are queued and
    /// run, in FIFO order, by the outermost settle on this thread once its current continuation
    /// returns. The stack depth stays constant however long a chain of inline stages is.
    pub(crate) fn settle(&self, outcome: Outcome<T>) -> bool {
        let outcome = Arc::new(outcome);
        let (continuations, wakers) = {
            let mut state = self.inner.state.lock();
            let pending = match &mut *state {
                State::Pending {
                    continuations,
                    wakers,
                } => (mem::take(continuations), mem::take(wakers)),
                State::Settled(_) => {
                    debug!("ignoring attempt to settle a promise that is already settled");
                    return false;
                }
            };
            *state = State::Settled(Arc::clone(&outcome));
            pending
        };
        self.inner.settled.notify_all();
        for waker in wakers {
            waker.wake();
        }
        if !continuations.is_empty() {
            trace!("running {} continuation(s)", continuations.len());
            run_deferred(continuations.into_iter().map(|continuation| {
                let outcome = Arc::clone(&outcome);
                Box::new(move || continuation(&outcome)) as Deferred
            }));
        }
        true
    }

    /// Registers a continuation that is run exactly once with the settled outcome.
    /// - if the promise is pending, then the thread that settles the promise runs the continuation
    /// - if the promise is already settled, then the continuation is run immediately on the
    ///   calling thread
    pub(crate) fn subscribe<F>(&self, continuation: F)
    where
        F: FnOnce(&Outcome<T>) + Send + 'static,
    {
        let outcome = {
            let mut state = self.inner.state.lock();
            match &mut *state {
                State::Pending { continuations, .. } => {
                    continuations.push(Box::new(continuation));
                    return;
                }
                State::Settled(outcome) => Arc::clone(outcome),
            }
        };
        continuation(&outcome);
    }
}

impl<T: Clone> Promise<T> {
    /// Blocks the calling thread until the promise is settled.
    ///
    /// ## Errors
    /// If the promise was settled with a failure, then the failure is returned wrapped in an
    /// `ExecutionError::Failed`.
    pub fn get(&self) -> Result<T, ExecutionError> {
        self.join().map_err(ExecutionError::Failed)
    }

    /// Blocks the calling thread until the promise is settled, or the timeout expires.
    pub fn get_timeout(&self, timeout: Duration) -> Result<T, ExecutionError> {
        if self.wait_timeout(timeout) {
            self.get()
        } else {
            Err(ExecutionError::Timeout(timeout))
        }
    }

    /// Blocks the calling thread until the promise is settled, and returns the outcome as is.
    pub fn join(&self) -> Outcome<T> {
        let mut state = self.inner.state.lock();
        loop {
            if let State::Settled(outcome) = &*state {
                return (**outcome).clone();
            }
            self.inner.settled.wait(&mut state);
        }
    }

    /// Returns the value if settled, else returns the specified default value. Never blocks.
    pub fn get_now(&self, default: T) -> Result<T, ExecutionError> {
        match self.outcome() {
            Some(outcome) => outcome.map_err(ExecutionError::Failed),
            None => Ok(default),
        }
    }

    /// Returns the outcome if the promise is settled. Never blocks.
    pub fn outcome(&self) -> Option<Outcome<T>> {
        match &*self.inner.state.lock() {
            State::Settled(outcome) => Some((**outcome).clone()),
            State::Pending { .. } => None,
        }
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Promise({:?})", self.state())
    }
}

/// Enables a promise to be awaited from an async context instead of blocking a thread.
impl<T: Clone> Future for Promise<T> {
    type Output = Result<T, ExecutionError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.inner.state.lock();
        match &mut *state {
            State::Settled(outcome) => {
                Poll::Ready((**outcome).clone().map_err(ExecutionError::Failed))
            }
            State::Pending { wakers, .. } => {
                if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

/// Object safe view of a promise's settlement, regardless of its value type.
///
/// Used to join promises with heterogeneous value types, see [all_of](../combinators/fn.all_of.html).
pub trait Settle: Send + Sync {
    /// Registers a callback that is invoked exactly once when the promise settles.
    /// The callback receives the failure, if the promise failed.
    fn on_settled(&self, callback: Box<dyn FnOnce(Option<TaskFailure>) + Send + 'static>);

    /// Returns true if the promise has been settled
    fn is_settled(&self) -> bool;
}

impl<T: Send + Sync + 'static> Settle for Promise<T> {
    fn on_settled(&self, callback: Box<dyn FnOnce(Option<TaskFailure>) + Send + 'static>) {
        self.subscribe(move |outcome| callback(outcome.as_ref().err().cloned()))
    }

    fn is_settled(&self) -> bool {
        self.is_done()
    }
}
