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

//! Execution handoff decides which thread runs a continuation once its upstream promise settles.

use crate::concurrent::execution::{self, Executor, ExecutorError, Job};
use std::fmt;

/// Where a continuation runs once the promise it depends on is settled.
///
/// The executor forms always hand the continuation to the executor, even when the settling thread
/// is idle or the promise was already settled at registration time. That is what lets a pipeline
/// hop between pools at each stage, e.g., an IO pool, a CPU pool and a single thread UI executor.
#[derive(Clone)]
pub enum Handoff {
    /// run inline, on whichever thread settles the upstream promise. If the promise is already
    /// settled when the continuation is registered, then it runs on the registering thread.
    CompletingThread,
    /// run on the global executor
    DefaultExecutor,
    /// run on the specified executor
    Executor(Executor),
}

impl Handoff {
    /// Returns the executor the continuation is handed off to, or None if it runs inline
    pub fn executor(&self) -> Option<Executor> {
        match self {
            Handoff::CompletingThread => None,
            Handoff::DefaultExecutor => Some(execution::global_executor()),
            Handoff::Executor(executor) => Some(executor.clone()),
        }
    }

    /// Runs the continuation according to the handoff policy.
    ///
    /// ## Errors
    /// If the executor is shut down or rejects the continuation, in which case the continuation is
    /// dropped without running.
    pub(crate) fn run<F>(&self, continuation: F) -> Result<(), ExecutorError>
    where
        F: FnOnce() + Send + 'static,
    {
        match self.executor() {
            None => {
                continuation();
                Ok(())
            }
            Some(executor) => executor.execute(Box::new(continuation) as Job),
        }
    }
}

impl Default for Handoff {
    fn default() -> Self {
        Handoff::DefaultExecutor
    }
}

impl From<Executor> for Handoff {
    fn from(executor: Executor) -> Self {
        Handoff::Executor(executor)
    }
}

impl From<&Executor> for Handoff {
    fn from(executor: &Executor) -> Self {
        Handoff::Executor(executor.clone())
    }
}

impl fmt::Debug for Handoff {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Handoff::CompletingThread => f.write_str("Handoff::CompletingThread"),
            Handoff::DefaultExecutor => f.write_str("Handoff::DefaultExecutor"),
            Handoff::Executor(executor) => write!(f, "Handoff::{:?}", executor),
        }
    }
}
