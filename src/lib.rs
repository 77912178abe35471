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

//! **vow** provides write-once promises, executors and a combinator algebra for composing
//! asynchronous work across thread pools.
//!
//! - [Task](task/struct.Task.html) - a deferred, single shot computation
//! - [Executor](concurrent/execution/struct.Executor.html) - runs tasks on worker threads, returning
//!   a [Promise](concurrent/promise/struct.Promise.html) per task
//! - [Promise](concurrent/promise/struct.Promise.html) - write-once container for an eventual value
//!   or failure, which can be blocked on, awaited, or composed
//! - [combinators](concurrent/combinators/index.html) - derive new promises from existing ones
//! - [Handoff](concurrent/handoff/enum.Handoff.html) - decides which thread runs a continuation
//!
//! ```
//! use vow::{join_all, ExecutorBuilder, ExecutorId, Task};
//! use std::num::NonZeroUsize;
//!
//! let executor = ExecutorBuilder::new(ExecutorId::generate())
//!     .set_pool_size(NonZeroUsize::new(4).unwrap())
//!     .build()
//!     .unwrap();
//! let weights: Vec<_> = [1111_u32, 111, 11]
//!     .iter()
//!     .map(|&weight| executor.submit(Task::supplier(move || weight)).unwrap())
//!     .collect();
//! let heaviest = join_all(&weights)
//!     .then_apply(|weights| weights.into_iter().max())
//!     .get()
//!     .unwrap();
//! assert_eq!(heaviest, Some(1111));
//! ```
//!
//! Cancellation is not supported: once a task is submitted, it runs to completion.

#![allow(clippy::unreadable_literal)]
#![deny(missing_docs, missing_debug_implementations)]
#![doc(html_root_url = "https://docs.rs/vow/0.1.0")]

#[allow(unused_imports)]
#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod concurrent;
pub mod errors;
pub mod task;

pub use crate::{
    concurrent::{
        combinators::{all_of, any_of, join2, join3, join_all},
        execution::{
            global_executor, run_async, supply_async, Execute, Executor, ExecutorBuilder,
            ExecutorError, ExecutorId, ExecutorKind, ExecutorRegistryError, ExecutorsConfig, Job,
        },
        handoff::Handoff,
        promise::{Outcome, Promise, PromiseState, Settle},
    },
    errors::{CombinatorError, ExecutionError, TaskFailure},
    task::Task,
};

#[cfg(test)]
fn log_config() -> vow_log::LogConfig {
    vow_log::LogConfigBuilder::new(vow_log::Level::Info)
        .target_level(
            vow_log::Target::from(env!("CARGO_PKG_NAME")),
            vow_log::Level::Debug,
        )
        .build()
}

#[cfg(test)]
fn configure_logging() {
    // tests share the process wide logger
    let _ = vow_log::init(log_config());
}
