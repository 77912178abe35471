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

//! The thread pools that back the built-in executor kinds.
//!
//! Worker threads are named `{executor_id}-{n}`.

use super::{Execute, ExecutorBuilder, ExecutorId, Job};
use futures::executor::ThreadPool;
use parking_lot::Mutex;
use std::{
    io,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};
use vow_log::*;

/// Multiplexes jobs onto a fixed number of worker threads.
/// Defaults to one thread per CPU.
pub(crate) struct ThreadPoolBackend {
    thread_pool: ThreadPool,
    pool_size: usize,
}

impl ThreadPoolBackend {
    pub(crate) fn new(config: &ExecutorBuilder) -> io::Result<Self> {
        let id = config.executor_id();
        let pool_size = config.pool_size().unwrap_or_else(num_cpus::get);
        let mut builder = ThreadPool::builder();
        builder
            .pool_size(pool_size)
            .name_prefix(format!("{}-", id))
            .after_start(move |thread_index| {
                debug!("Executor thread has started: {}-{}", id, thread_index)
            })
            .before_stop(move |thread_index| {
                debug!("Executor thread is stopping: {}-{}", id, thread_index)
            });
        if let Some(size) = config.stack_size() {
            builder.stack_size(size);
        }
        Ok(Self {
            thread_pool: builder.create()?,
            pool_size,
        })
    }
}

impl Execute for ThreadPoolBackend {
    fn execute(&self, job: Job) -> Result<(), failure::Error> {
        self.thread_pool.spawn_ok(async move { job() });
        Ok(())
    }

    fn thread_pool_size(&self) -> Option<usize> {
        Some(self.pool_size)
    }
}

/// Spawns a new thread per job
pub(crate) struct ThreadPerTaskBackend {
    id: ExecutorId,
    stack_size: Option<usize>,
    thread_counter: AtomicUsize,
}

impl ThreadPerTaskBackend {
    pub(crate) fn new(config: &ExecutorBuilder) -> Self {
        Self {
            id: config.executor_id(),
            stack_size: config.stack_size(),
            thread_counter: AtomicUsize::new(0),
        }
    }
}

impl Execute for ThreadPerTaskBackend {
    fn execute(&self, job: Job) -> Result<(), failure::Error> {
        let n = self.thread_counter.fetch_add(1, Ordering::Relaxed);
        let mut builder = thread::Builder::new().name(format!("{}-{}", self.id, n));
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }
        builder.spawn(job)?;
        Ok(())
    }
}

/// Runs jobs one at a time, in submission order, on a single dedicated thread.
pub(crate) struct SingleThreadBackend {
    sender: Mutex<Option<crossbeam::channel::Sender<Job>>>,
}

impl SingleThreadBackend {
    pub(crate) fn new(config: &ExecutorBuilder) -> io::Result<Self> {
        let id = config.executor_id();
        let (sender, receiver) = crossbeam::channel::unbounded::<Job>();
        let mut builder = thread::Builder::new().name(format!("{}-0", id));
        if let Some(size) = config.stack_size() {
            builder = builder.stack_size(size);
        }
        builder.spawn(move || {
            debug!("Executor thread has started: {}-0", id);
            // the loop ends once the sender is dropped and the queue is drained
            for job in receiver {
                job();
            }
            debug!("Executor thread is stopping: {}-0", id);
        })?;
        Ok(Self {
            sender: Mutex::new(Some(sender)),
        })
    }
}

impl Execute for SingleThreadBackend {
    fn execute(&self, job: Job) -> Result<(), failure::Error> {
        match self.sender.lock().as_ref() {
            Some(sender) => sender
                .send(job)
                .map_err(|_| failure::err_msg("executor thread has stopped")),
            None => Err(failure::err_msg("executor thread has been shut down")),
        }
    }

    fn thread_pool_size(&self) -> Option<usize> {
        Some(1)
    }

    fn shutdown(&self) {
        self.sender.lock().take();
    }
}
