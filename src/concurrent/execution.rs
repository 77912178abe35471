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

//! Exposes the primitives for running tasks on worker threads:
//! - [Executor](struct.Executor.html) - a clonable handle to a pool of worker threads, which runs
//!   submitted [Task](../../task/struct.Task.html)s and returns a [Promise](../promise/struct.Promise.html)
//!   per submission
//! - [ExecutorBuilder](struct.ExecutorBuilder.html) - serializable executor config
//! - a global executor registry, which always provides the global executor, i.e., the default shared
//!   pool used by async combinators when no executor is specified
//!
//! Any type that implements [Execute](trait.Execute.html) can back an Executor, e.g., a UI event
//! dispatch thread.

use crate::{concurrent::promise::Promise, task::Task};
use failure::Fail;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt, io,
    num::NonZeroUsize,
    panic::{catch_unwind, AssertUnwindSafe},
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use vow_log::*;

mod backends;
pub mod config;
pub mod metrics;

pub use self::config::ExecutorsConfig;

lazy_static! {
    /// Global Executor registry
    static ref EXECUTORS: RwLock<ExecutorRegistry> = RwLock::new(ExecutorRegistry::default());
}

/// A unit of work handed to an executor backend
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// An executor can only be registered once, and once it is registered, it stays registered for the
/// life of the app.
/// - fails if an executor with the same ID is already registered
pub fn register(executor: Executor) -> Result<Executor, ExecutorRegistryError> {
    EXECUTORS.write().register(executor)
}

/// Returns the registered executor IDs
pub fn executor_ids() -> smallvec::SmallVec<[ExecutorId; 16]> {
    EXECUTORS.read().executor_ids()
}

/// returns the Executor for the specified ID
pub fn executor(id: ExecutorId) -> Option<Executor> {
    EXECUTORS.read().executor(id)
}

/// Returns the global executor, which is provided by default.
pub fn global_executor() -> Executor {
    EXECUTORS.read().global_executor()
}

/// Submits the task to the global executor
pub fn supply_async<T>(task: Task<T>) -> Result<Promise<T>, ExecutorError>
where
    T: Send + Sync + 'static,
{
    global_executor().submit(task)
}

/// Runs the procedure on the global executor
pub fn run_async<F>(f: F) -> Result<Promise<()>, ExecutorError>
where
    F: FnOnce() + Send + 'static,
{
    global_executor().submit(Task::runnable(f))
}

/// Executor registry
pub struct ExecutorRegistry {
    global_executor: Executor,
    executors: hashbrown::HashMap<ExecutorId, Executor>,
}

impl ExecutorRegistry {
    /// An executor can only be registered once, and once it is registered, it stays registered for the
    /// life of the app.
    pub fn register(&mut self, executor: Executor) -> Result<Executor, ExecutorRegistryError> {
        let id = executor.id();
        if id == Executor::GLOBAL_EXECUTOR_ID || self.executors.contains_key(&id) {
            return Err(ExecutorRegistryError::ExecutorAlreadyRegistered(id));
        }
        self.executors.insert(id, executor.clone());
        debug!("registered executor: {}", id);
        Ok(executor)
    }

    /// Returns the registered executor IDs
    pub fn executor_ids(&self) -> smallvec::SmallVec<[ExecutorId; 16]> {
        self.executors.keys().cloned().collect()
    }

    /// returns the Executor for the specified ID
    pub fn executor(&self, id: ExecutorId) -> Option<Executor> {
        match self.executors.get(&id) {
            Some(executor) => Some(executor.clone()),
            None if id == Executor::GLOBAL_EXECUTOR_ID => Some(self.global_executor.clone()),
            None => None,
        }
    }

    /// Returns the global executor, which is provided by default.
    pub fn global_executor(&self) -> Executor {
        self.global_executor.clone()
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        let global_executor = ExecutorBuilder::new(Executor::GLOBAL_EXECUTOR_ID)
            .build()
            .expect("failed to create the global executor thread pool");
        Self {
            global_executor,
            executors: hashbrown::HashMap::new(),
        }
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Executors(executor count = {})", self.executors.len())
    }
}

/// Runs jobs on worker threads. This is the seam for plugging in any kind of thread pool, including
/// single thread affinity executors such as a UI event dispatch thread.
///
/// ## Contract
/// - `execute()` must never run the job inline on the calling thread
/// - each accepted job must be run exactly once
pub trait Execute: Send + Sync {
    /// Schedules the job to run on a worker thread
    fn execute(&self, job: Job) -> Result<(), failure::Error>;

    /// The number of worker threads, or None if unbounded
    fn thread_pool_size(&self) -> Option<usize> {
        None
    }

    /// Stop accepting jobs. Jobs that were already accepted still run.
    fn shutdown(&self) {}
}

/// A clonable handle to a pool of worker threads. Cloning it will only create a new reference, not
/// a new pool.
///
/// The Executor does not own the promises it produces: they are shared between the worker that
/// settles them and everyone observing them.
///
/// ## Metrics
/// - submitted, completed, failed and active task counts, labeled by ExecutorId
/// - the series are removed once the last handle is dropped
#[derive(Clone)]
pub struct Executor {
    id: ExecutorId,
    backend: Arc<dyn Execute>,
    shutdown: Arc<AtomicBool>,
    metrics: metrics::ExecutorMetrics,
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Executor({})", self.id)
    }
}

impl Executor {
    /// Global ExecutorId, i.e., for the global Executor
    pub const GLOBAL_EXECUTOR_ID: ExecutorId = ExecutorId(1871427164235073850597045237139528853);

    /// Wraps a custom backend, e.g., a UI event dispatch thread
    pub fn custom<E: Execute + 'static>(id: ExecutorId, backend: E) -> Self {
        Self::new(id, Arc::new(backend))
    }

    fn new(id: ExecutorId, backend: Arc<dyn Execute>) -> Self {
        let metrics = metrics::ExecutorMetrics::new(id, backend.thread_pool_size());
        Self {
            id,
            backend,
            shutdown: Arc::new(AtomicBool::new(false)),
            metrics,
        }
    }

    /// Returns the ExecutorId
    pub const fn id(&self) -> ExecutorId {
        self.id
    }

    /// Submits the task to run on a worker thread, and returns immediately with a pending promise that
    /// the worker settles with the task outcome.
    ///
    /// ## Errors
    /// - if the executor is shut down
    /// - if the backend rejects the task
    ///
    /// Failures raised by the task itself never surface here - they are captured by the promise.
    pub fn submit<T>(&self, task: Task<T>) -> Result<Promise<T>, ExecutorError>
    where
        T: Send + Sync + 'static,
    {
        let promise = Promise::new();
        let target = promise.clone();
        let metrics = self.metrics.clone();
        self.dispatch(Box::new(move || {
            let name = task.name().map(str::to_string);
            let outcome = task.run();
            if let Err(ref failure) = outcome {
                debug!("task {:?} failed: {}", name, failure);
            }
            metrics.finished(outcome.is_ok());
            // release the series handle before the promise becomes observable
            drop(metrics);
            target.settle(outcome);
        }))?;
        Ok(promise)
    }

    /// Submits all the tasks, and then blocks until every one of them is settled.
    /// The promises are returned in task order.
    pub fn invoke_all<T, I>(&self, tasks: I) -> Result<Vec<Promise<T>>, ExecutorError>
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = Task<T>>,
    {
        let promises = tasks
            .into_iter()
            .map(|task| self.submit(task))
            .collect::<Result<Vec<_>, _>>()?;
        for promise in promises.iter() {
            promise.wait();
        }
        Ok(promises)
    }

    /// Schedules a raw job. Panics raised by the job are caught and logged.
    pub fn execute(&self, job: Job) -> Result<(), ExecutorError> {
        let metrics = self.metrics.clone();
        let id = self.id;
        self.dispatch(Box::new(move || {
            let result = catch_unwind(AssertUnwindSafe(job));
            if result.is_err() {
                error!("job panicked on executor: {}", id);
            }
            metrics.finished(result.is_ok());
        }))
    }

    fn dispatch(&self, job: Job) -> Result<(), ExecutorError> {
        if self.is_shutdown() {
            warn!("rejecting job because executor is shut down: {}", self.id);
            return Err(ExecutorError::Shutdown(self.id));
        }
        self.metrics.dispatched();
        match self.backend.execute(job) {
            Ok(_) => {
                self.metrics.accepted();
                Ok(())
            }
            Err(err) => {
                self.metrics.rejected();
                warn!("executor rejected job: {} : {}", self.id, err);
                Err(ExecutorError::Rejected(self.id, err))
            }
        }
    }

    /// Stops accepting new tasks. Tasks that were already submitted still run to completion.
    pub fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            info!("executor is shutting down: {}", self.id);
            self.backend.shutdown();
        }
    }

    /// Returns true if the executor no longer accepts tasks
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// The number of worker threads, or None if threads are spawned on demand
    pub fn thread_pool_size(&self) -> Option<usize> {
        self.backend.thread_pool_size()
    }

    /// returns the number of tasks and jobs that have been accepted by this Executor
    pub fn submitted_task_count(&self) -> u64 {
        self.metrics.submitted_count()
    }

    /// returns the number of tasks and jobs that have finished running, including failures
    pub fn completed_task_count(&self) -> u64 {
        self.metrics.completed_count()
    }

    /// returns the number of tasks that failed, i.e., returned an error or panicked
    pub fn failed_task_count(&self) -> u64 {
        self.metrics.failed_count()
    }

    /// returns the number of tasks that are queued or running
    pub fn active_task_count(&self) -> u64 {
        self.metrics.active_count()
    }
}

/// Unique Executor ID, displayed and serialized as a [ULID](https://github.com/ulid/spec)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ExecutorId(pub u128);

impl ExecutorId {
    /// generates a new unique ID
    pub fn generate() -> Self {
        ExecutorId(rusty_ulid::Ulid::generate().into())
    }
}

impl fmt::Display for ExecutorId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&rusty_ulid::Ulid::from(self.0), f)
    }
}

impl FromStr for ExecutorId {
    type Err = rusty_ulid::DecodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ulid: rusty_ulid::Ulid = s.parse()?;
        Ok(ExecutorId(ulid.into()))
    }
}

impl Serialize for ExecutorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ExecutorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        id.parse().map_err(de::Error::custom)
    }
}

/// Executor registry related errors
#[derive(Fail, Debug)]
pub enum ExecutorRegistryError {
    /// When a ThreadPool creation failure occurs.
    #[fail(display = "Failed to create ThreadPool: {}", _0)]
    ThreadPoolCreateFailed(io::Error),
    /// When trying to register an Executor using an ID that is already registered.
    #[fail(display = "Executor is already registered: {}", _0)]
    ExecutorAlreadyRegistered(ExecutorId),
    /// The executors config could not be parsed
    #[fail(display = "Invalid executors config: {}", _0)]
    InvalidConfig(serde_json::Error),
}

/// Executor related errors
#[derive(Fail, Debug)]
pub enum ExecutorError {
    /// The executor has been shut down and no longer accepts tasks
    #[fail(display = "Executor is shut down: {}", _0)]
    Shutdown(ExecutorId),
    /// The executor backend rejected the task
    #[fail(display = "Executor rejected the task: {} : {}", _0, _1)]
    Rejected(ExecutorId, failure::Error),
}

/// The kind of thread pool that backs an Executor
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ExecutorKind {
    /// A fixed number of worker threads, sized to the number of CPUs by default
    FixedThreadPool,
    /// Unbounded - each task runs on its own newly spawned thread
    ThreadPerTask,
    /// A single dedicated worker thread, which runs tasks in submission order
    SingleThread,
}

impl Default for ExecutorKind {
    fn default() -> Self {
        ExecutorKind::FixedThreadPool
    }
}

/// Executor config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorBuilder {
    id: ExecutorId,
    #[serde(default)]
    kind: ExecutorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stack_size: Option<NonZeroUsize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pool_size: Option<NonZeroUsize>,
}

impl ExecutorBuilder {
    /// constructor
    pub fn new(id: ExecutorId) -> Self {
        Self {
            id,
            kind: ExecutorKind::default(),
            stack_size: None,
            pool_size: None,
        }
    }

    /// Sets the kind of thread pool
    pub fn set_kind(mut self, kind: ExecutorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the thread stack size
    pub fn set_stack_size(mut self, size: NonZeroUsize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Sets the thread pool size - only applies to `ExecutorKind::FixedThreadPool`
    pub fn set_pool_size(mut self, size: NonZeroUsize) -> Self {
        self.pool_size = Some(size);
        self
    }

    /// Returns the ExecutorId
    pub fn executor_id(&self) -> ExecutorId {
        self.id
    }

    /// Returns the kind of thread pool
    pub fn kind(&self) -> ExecutorKind {
        self.kind
    }

    /// Returns the thread stack size
    pub fn stack_size(&self) -> Option<usize> {
        self.stack_size.map(NonZeroUsize::get)
    }

    /// Returns the thread pool size
    pub fn pool_size(&self) -> Option<usize> {
        self.pool_size.map(NonZeroUsize::get)
    }

    /// Builds the Executor, without registering it
    pub fn build(&self) -> Result<Executor, ExecutorRegistryError> {
        let backend: Arc<dyn Execute> = match self.kind {
            ExecutorKind::FixedThreadPool => Arc::new(
                backends::ThreadPoolBackend::new(self)
                    .map_err(ExecutorRegistryError::ThreadPoolCreateFailed)?,
            ),
            ExecutorKind::ThreadPerTask => Arc::new(backends::ThreadPerTaskBackend::new(self)),
            ExecutorKind::SingleThread => Arc::new(
                backends::SingleThreadBackend::new(self)
                    .map_err(ExecutorRegistryError::ThreadPoolCreateFailed)?,
            ),
        };
        Ok(Executor::new(self.id, backend))
    }

    /// Tries to build and register the Executor with the global ExecutorRegistry
    pub fn register(&self) -> Result<Executor, ExecutorRegistryError> {
        let mut executors = EXECUTORS.write();
        if self.id == Executor::GLOBAL_EXECUTOR_ID || executors.executor(self.id).is_some() {
            return Err(ExecutorRegistryError::ExecutorAlreadyRegistered(self.id));
        }
        executors.register(self.build()?)
    }
}

#[allow(warnings)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::configure_logging;
    use std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
        thread,
        time::Duration,
    };

    #[test]
    fn submit_returns_pending_promise() {
        configure_logging();

        let executor = ExecutorBuilder::new(ExecutorId::generate())
            .set_pool_size(NonZeroUsize::new(1).unwrap())
            .build()
            .unwrap();
        let (tx, rx) = crossbeam::channel::bounded::<()>(0);
        let promise = executor
            .submit(Task::callable(move || {
                rx.recv()?;
                Ok(42)
            }))
            .unwrap();
        // the task is blocked until it receives the signal
        assert!(!promise.is_done());
        tx.send(()).unwrap();
        assert_eq!(promise.get().unwrap(), 42);
        assert!(promise.is_done());
    }

    #[test]
    fn task_failure_is_captured_by_promise() {
        configure_logging();

        let executor = global_executor();
        let failed_before = executor.failed_task_count();
        let promise = executor
            .submit(Task::<u32>::supplier(|| panic!("BOOM!!!")))
            .unwrap();
        let err = promise.get().unwrap_err();
        assert!(err.failure().unwrap().is_panic());
        assert!(executor.failed_task_count() > failed_before);
    }

    #[test]
    fn global_executor_is_always_available() {
        configure_logging();

        let executor = executor(Executor::GLOBAL_EXECUTOR_ID).unwrap();
        assert_eq!(executor.id(), Executor::GLOBAL_EXECUTOR_ID);
        assert_eq!(executor.thread_pool_size(), Some(num_cpus::get()));
        assert_eq!(supply_async(Task::supplier(|| 1)).unwrap().get().unwrap(), 1);
        run_async(|| info!("run_async")).unwrap().get().unwrap();
    }

    #[test]
    fn registered_executors() {
        configure_logging();

        for _ in 0..8 {
            assert!(ExecutorBuilder::new(ExecutorId::generate())
                .set_kind(ExecutorKind::ThreadPerTask)
                .register()
                .is_ok());
        }

        let builder = ExecutorBuilder::new(ExecutorId::generate())
            .set_pool_size(NonZeroUsize::new(2).unwrap());
        let executor = builder.register().unwrap();
        assert!(executor_ids().contains(&builder.executor_id()));
        assert_eq!(
            self::executor(builder.executor_id()).unwrap().id(),
            executor.id()
        );
        match builder
            .register()
            .expect_err("expected ExecutorAlreadyRegistered")
        {
            ExecutorRegistryError::ExecutorAlreadyRegistered(id) => {
                assert_eq!(id, builder.executor_id())
            }
            err => panic!(
                "expected ExecutorAlreadyRegistered, but error was : {:?}",
                err
            ),
        }

        match ExecutorBuilder::new(Executor::GLOBAL_EXECUTOR_ID).register() {
            Err(ExecutorRegistryError::ExecutorAlreadyRegistered(_)) => {}
            other => panic!("global executor id must be reserved: {:?}", other),
        }
    }

    #[test]
    fn executor_builder() {
        let id = ExecutorId::generate();
        let builder = ExecutorBuilder::new(id);
        assert_eq!(builder.executor_id(), id);
        assert_eq!(builder.kind(), ExecutorKind::FixedThreadPool);
        assert!(builder.stack_size().is_none());
        assert!(builder.pool_size().is_none());
        let builder = builder.set_stack_size(NonZeroUsize::new(1024 * 1024).unwrap());
        assert_eq!(builder.stack_size().unwrap(), 1024 * 1024);
        let builder = builder
            .set_pool_size(NonZeroUsize::new(64).unwrap())
            .set_kind(ExecutorKind::SingleThread);
        assert_eq!(builder.pool_size().unwrap(), 64);
        assert_eq!(builder.kind(), ExecutorKind::SingleThread);
    }

    #[test]
    fn executor_id_display_round_trip() {
        let id = ExecutorId::generate();
        assert_eq!(id.to_string().len(), 26);
        assert_eq!(id.to_string().parse::<ExecutorId>().unwrap(), id);
        assert!("not a ulid".parse::<ExecutorId>().is_err());
    }

    #[test]
    fn fixed_thread_pool_is_bounded() {
        configure_logging();

        let executor = ExecutorBuilder::new(ExecutorId::generate())
            .set_pool_size(NonZeroUsize::new(2).unwrap())
            .build()
            .unwrap();
        let threads = Arc::new(Mutex::new(HashSet::new()));
        let tasks = (0..16).map(|_| {
            let threads = Arc::clone(&threads);
            Task::runnable(move || {
                threads.lock().unwrap().insert(thread::current().id());
                thread::sleep(Duration::from_millis(1));
            })
        });
        let promises = executor.invoke_all(tasks).unwrap();
        assert!(promises.iter().all(|promise| promise.is_done()));
        assert!(threads.lock().unwrap().len() <= 2);
    }

    #[test]
    fn thread_per_task_is_unbounded() {
        configure_logging();

        let executor = ExecutorBuilder::new(ExecutorId::generate())
            .set_kind(ExecutorKind::ThreadPerTask)
            .build()
            .unwrap();
        assert_eq!(executor.thread_pool_size(), None);
        // all tasks must be running at the same time to pass the barrier
        let barrier = Arc::new(std::sync::Barrier::new(8));
        let tasks = (0..8).map(|_| {
            let barrier = Arc::clone(&barrier);
            Task::runnable(move || {
                barrier.wait();
            })
        });
        let promises = executor.invoke_all(tasks).unwrap();
        assert!(promises.iter().all(|promise| promise.get().is_ok()));
    }

    #[test]
    fn single_thread_runs_tasks_in_order_on_one_thread() {
        configure_logging();

        let executor = ExecutorBuilder::new(ExecutorId::generate())
            .set_kind(ExecutorKind::SingleThread)
            .build()
            .unwrap();
        assert_eq!(executor.thread_pool_size(), Some(1));
        let order = Arc::new(Mutex::new(Vec::new()));
        let tasks = (0..10).map(|i| {
            let order = Arc::clone(&order);
            Task::supplier(move || {
                order.lock().unwrap().push(i);
                thread::current().name().map(str::to_string)
            })
        });
        let promises = executor.invoke_all(tasks).unwrap();
        let thread_names: HashSet<_> = promises
            .iter()
            .map(|promise| promise.get().unwrap())
            .collect();
        assert_eq!(thread_names.len(), 1);
        assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn shutdown_rejects_new_tasks() {
        configure_logging();

        for kind in &[
            ExecutorKind::FixedThreadPool,
            ExecutorKind::ThreadPerTask,
            ExecutorKind::SingleThread,
        ] {
            let executor = ExecutorBuilder::new(ExecutorId::generate())
                .set_kind(*kind)
                .build()
                .unwrap();
            let (tx, rx) = crossbeam::channel::bounded::<()>(0);
            let in_flight = executor
                .submit(Task::callable(move || {
                    rx.recv()?;
                    Ok(1)
                }))
                .unwrap();
            executor.shutdown();
            assert!(executor.is_shutdown());
            match executor.submit(Task::supplier(|| 2)) {
                Err(ExecutorError::Shutdown(id)) => assert_eq!(id, executor.id()),
                other => panic!("expected ExecutorError::Shutdown: {:?}", other),
            }
            // in flight tasks run to completion
            tx.send(()).unwrap();
            assert_eq!(in_flight.get().unwrap(), 1);
        }
    }

    #[test]
    fn task_counts() {
        configure_logging();

        let executor = ExecutorBuilder::new(ExecutorId::generate())
            .set_pool_size(NonZeroUsize::new(2).unwrap())
            .build()
            .unwrap();
        let tasks = (0..10).map(|i| {
            Task::callable(move || {
                if i % 2 == 0 {
                    Ok(i)
                } else {
                    Err(failure::err_msg("odd"))
                }
            })
        });
        let promises = executor.invoke_all(tasks).unwrap();
        assert_eq!(promises.iter().filter(|p| p.get().is_ok()).count(), 5);
        assert_eq!(executor.submitted_task_count(), 10);
        assert_eq!(executor.completed_task_count(), 10);
        assert_eq!(executor.failed_task_count(), 5);
        assert_eq!(executor.active_task_count(), 0);
    }

    #[test]
    fn execute_catches_job_panics() {
        configure_logging();

        let executor = ExecutorBuilder::new(ExecutorId::generate())
            .set_kind(ExecutorKind::SingleThread)
            .build()
            .unwrap();
        executor.execute(Box::new(|| panic!("BOOM!!!"))).unwrap();
        // the worker thread survives the panic
        assert_eq!(
            executor.submit(Task::supplier(|| 1)).unwrap().get().unwrap(),
            1
        );
    }

    struct RejectAll;

    impl Execute for RejectAll {
        fn execute(&self, _job: Job) -> Result<(), failure::Error> {
            Err(failure::err_msg("queue is full"))
        }
    }

    #[test]
    fn custom_backend_rejection() {
        configure_logging();

        let executor = Executor::custom(ExecutorId::generate(), RejectAll);
        match executor.submit(Task::supplier(|| 1)) {
            Err(ExecutorError::Rejected(id, err)) => {
                assert_eq!(id, executor.id());
                assert_eq!(err.to_string(), "queue is full");
            }
            other => panic!("expected ExecutorError::Rejected: {:?}", other),
        }
        assert_eq!(executor.active_task_count(), 0);
    }
}
