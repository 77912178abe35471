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

//! Task units, i.e., deferred single-shot computations that are submitted to an Executor.

use crate::{concurrent::promise::Outcome, errors::TaskFailure};
use std::{
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
};

/// A deferred computation that is run at most once.
///
/// The task is owned by whoever submits it. Any state shared with other tasks must be captured
/// explicitly by the closure, using thread safe types.
///
/// ```rust
/// # use vow::Task;
/// let task = Task::supplier(|| 40 + 2).named("answer");
/// assert_eq!(task.name(), Some("answer"));
/// assert_eq!(task.run().unwrap(), 42);
/// ```
pub struct Task<T> {
    name: Option<String>,
    body: Box<dyn FnOnce() -> Result<T, failure::Error> + Send + 'static>,
}

impl<T> Task<T> {
    /// A task that produces a value, or fails with an error
    pub fn callable<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, failure::Error> + Send + 'static,
    {
        Self {
            name: None,
            body: Box::new(f),
        }
    }

    /// A task that always produces a value, unless it panics
    pub fn supplier<F>(f: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self::callable(move || Ok(f()))
    }

    /// Names the task - the name is used for logging
    pub fn named<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the task name
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(String::as_str)
    }

    /// Runs the task on the current thread. Errors and panics are captured as a TaskFailure.
    pub fn run(self) -> Outcome<T> {
        match catch_unwind(AssertUnwindSafe(self.body)) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(TaskFailure::from(err)),
            Err(panic) => Err(TaskFailure::from_panic(panic)),
        }
    }
}

impl Task<()> {
    /// A task that produces no value
    pub fn runnable<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::supplier(f)
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name {
            Some(ref name) => write!(f, "Task({})", name),
            None => f.write_str("Task"),
        }
    }
}

/// Runs a continuation body, capturing a panic as a TaskFailure
pub(crate) fn guarded<T, F>(f: F) -> Outcome<T>
where
    F: FnOnce() -> Outcome<T>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(outcome) => outcome,
        Err(panic) => Err(TaskFailure::from_panic(panic)),
    }
}
