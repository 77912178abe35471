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

//! Failures captured by promises and the errors raised when retrieving them.
//!
//! - [TaskFailure](enum.TaskFailure.html) is what a promise settles with when the computation
//!   behind it fails. It is shared by every dependent promise, thus it is cheap to clone.
//! - [ExecutionError](enum.ExecutionError.html) is what blocking retrieval returns. It wraps the
//!   task failure to signal that the failure originated asynchronously.

use failure::Fail;
use std::{any::Any, fmt, sync::Arc, time::Duration};

/// A failure raised by a task, a continuation, or an executor that rejected work.
///
/// Once captured, the same failure instance flows unchanged through every transform, chain and
/// consume stage until a recovery combinator intercepts it.
#[derive(Fail, Clone)]
pub enum TaskFailure {
    /// The computation returned an error
    #[fail(display = "{}", _0)]
    Error(Arc<failure::Error>),
    /// The computation panicked
    #[fail(display = "task panicked: {}", _0)]
    Panic(Arc<String>),
}

impl TaskFailure {
    /// constructor
    pub fn new<E: Into<failure::Error>>(err: E) -> Self {
        TaskFailure::Error(Arc::new(err.into()))
    }

    /// Creates a failure from a failure message
    pub fn msg<M: fmt::Display + fmt::Debug + Send + Sync + 'static>(msg: M) -> Self {
        TaskFailure::Error(Arc::new(failure::err_msg(msg)))
    }

    /// Captures a panic payload, as returned by [std::panic::catch_unwind](https://doc.rust-lang.org/std/panic/fn.catch_unwind.html)
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let msg = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "<non-string panic payload>".to_string()
        };
        TaskFailure::Panic(Arc::new(msg))
    }

    /// Returns true if the failure was caused by a panic
    pub fn is_panic(&self) -> bool {
        match self {
            TaskFailure::Panic(_) => true,
            TaskFailure::Error(_) => false,
        }
    }

    /// Returns the underlying error, unless the failure was a panic
    pub fn error(&self) -> Option<&failure::Error> {
        match self {
            TaskFailure::Error(err) => Some(err),
            TaskFailure::Panic(_) => None,
        }
    }

    /// Attempts to downcast the underlying error to a concrete type
    pub fn downcast_ref<E: Fail>(&self) -> Option<&E> {
        self.error().and_then(|err| err.downcast_ref::<E>())
    }

    /// Returns true if both refer to the same captured failure, i.e., one was propagated from the other
    pub fn ptr_eq(&self, other: &TaskFailure) -> bool {
        match (self, other) {
            (TaskFailure::Error(a), TaskFailure::Error(b)) => Arc::ptr_eq(a, b),
            (TaskFailure::Panic(a), TaskFailure::Panic(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskFailure::Error(err) => write!(f, "TaskFailure::Error({})", err),
            TaskFailure::Panic(msg) => write!(f, "TaskFailure::Panic({})", msg),
        }
    }
}

impl From<failure::Error> for TaskFailure {
    fn from(err: failure::Error) -> Self {
        TaskFailure::Error(Arc::new(err))
    }
}

impl From<crate::concurrent::execution::ExecutorError> for TaskFailure {
    fn from(err: crate::concurrent::execution::ExecutorError) -> Self {
        TaskFailure::new(err)
    }
}

impl From<CombinatorError> for TaskFailure {
    fn from(err: CombinatorError) -> Self {
        TaskFailure::new(err)
    }
}

/// Raised by blocking retrieval
#[derive(Fail, Debug, Clone)]
pub enum ExecutionError {
    /// The promise completed with a failure
    #[fail(display = "promise completed with failure: {}", _0)]
    Failed(#[cause] TaskFailure),
    /// The promise did not complete within the specified duration
    #[fail(display = "promise did not complete within {:?}", _0)]
    Timeout(Duration),
}

impl ExecutionError {
    /// Returns the task failure, if the promise completed with a failure
    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            ExecutionError::Failed(failure) => Some(failure),
            ExecutionError::Timeout(_) => None,
        }
    }

    /// Returns true if the retrieval timed out
    pub fn is_timeout(&self) -> bool {
        match self {
            ExecutionError::Timeout(_) => true,
            ExecutionError::Failed(_) => false,
        }
    }
}

impl From<TaskFailure> for ExecutionError {
    fn from(failure: TaskFailure) -> Self {
        ExecutionError::Failed(failure)
    }
}

/// Combinator misuse
#[derive(Fail, Debug, Clone, Copy, Eq, PartialEq)]
pub enum CombinatorError {
    /// A race needs at least one competitor
    #[fail(display = "any_of() requires at least one promise")]
    NoInputs,
}
