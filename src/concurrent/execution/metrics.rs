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

//! Executor metrics, registered with a dedicated prometheus registry.
//!
//! Every metric is labeled by the executor ID:
//! - `vow_executor_tasks_submitted` - tasks accepted by the backend
//! - `vow_executor_tasks_completed` - tasks that finished running, including failures
//! - `vow_executor_tasks_failed` - tasks that returned an error or panicked
//! - `vow_executor_active_tasks` - tasks that are queued or running
//! - `vow_executor_thread_pool_size` - number of worker threads, 0 if unbounded
//!
//! An executor's series are removed from the registry once the last handle to it is dropped,
//! including the handles held by queued jobs. Executors built with the same ID share their series,
//! and the first of them to be dropped removes it.

use super::ExecutorId;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry};
use std::{io::Write, sync::Arc};

/// Executor ID metric label
pub const EXECUTOR_ID_LABEL: &str = "executor_id";
/// Metric name: tasks accepted by the backend
pub const TASKS_SUBMITTED_METRIC: &str = "vow_executor_tasks_submitted";
/// Metric name: tasks that finished running
pub const TASKS_COMPLETED_METRIC: &str = "vow_executor_tasks_completed";
/// Metric name: tasks that failed
pub const TASKS_FAILED_METRIC: &str = "vow_executor_tasks_failed";
/// Metric name: tasks that are queued or running
pub const ACTIVE_TASKS_METRIC: &str = "vow_executor_active_tasks";
/// Metric name: worker thread count
pub const THREAD_POOL_SIZE_METRIC: &str = "vow_executor_thread_pool_size";

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
    static ref TASKS_SUBMITTED: IntCounterVec = register_int_counter_vec(
        TASKS_SUBMITTED_METRIC,
        "Number of tasks the Executor has accepted"
    );
    static ref TASKS_COMPLETED: IntCounterVec = register_int_counter_vec(
        TASKS_COMPLETED_METRIC,
        "Number of tasks the Executor has finished running"
    );
    static ref TASKS_FAILED: IntCounterVec = register_int_counter_vec(
        TASKS_FAILED_METRIC,
        "Number of tasks that failed"
    );
    static ref ACTIVE_TASKS: IntGaugeVec = register_int_gauge_vec(
        ACTIVE_TASKS_METRIC,
        "Number of tasks that are queued or running"
    );
    static ref THREAD_POOL_SIZE: IntGaugeVec = register_int_gauge_vec(
        THREAD_POOL_SIZE_METRIC,
        "Number of Executor worker threads"
    );
}

// panics if a metric name is invalid or registered twice
fn register_int_counter_vec(name: &str, help: &str) -> IntCounterVec {
    let metric = IntCounterVec::new(Opts::new(name, help), &[EXECUTOR_ID_LABEL])
        .expect("invalid IntCounterVec metric");
    REGISTRY
        .register(Box::new(metric.clone()))
        .expect("IntCounterVec metric registration failed");
    metric
}

fn register_int_gauge_vec(name: &str, help: &str) -> IntGaugeVec {
    let metric = IntGaugeVec::new(Opts::new(name, help), &[EXECUTOR_ID_LABEL])
        .expect("invalid IntGaugeVec metric");
    REGISTRY
        .register(Box::new(metric.clone()))
        .expect("IntGaugeVec metric registration failed");
    metric
}

/// Returns the registry that the executor metrics are registered with
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// gathers a snapshot of the executor metrics
pub fn gather() -> Vec<prometheus::proto::MetricFamily> {
    REGISTRY.gather()
}

/// Text encodes a snapshot of the executor metrics
pub fn text_encode_metrics<W: Write>(writer: &mut W) -> prometheus::Result<()> {
    prometheus::TextEncoder::new().encode(&gather(), writer)
}

/// The metric handles for a single executor
#[derive(Clone)]
pub(crate) struct ExecutorMetrics {
    series: Arc<Series>,
}

struct Series {
    id: String,
    submitted: IntCounter,
    completed: IntCounter,
    failed: IntCounter,
    active: IntGauge,
}

impl Drop for Series {
    fn drop(&mut self) {
        let labels = [self.id.as_str()];
        // the series may already be gone if another executor shared the ID
        let _ = TASKS_SUBMITTED.remove_label_values(&labels);
        let _ = TASKS_COMPLETED.remove_label_values(&labels);
        let _ = TASKS_FAILED.remove_label_values(&labels);
        let _ = ACTIVE_TASKS.remove_label_values(&labels);
        let _ = THREAD_POOL_SIZE.remove_label_values(&labels);
    }
}

impl ExecutorMetrics {
    pub(crate) fn new(id: ExecutorId, thread_pool_size: Option<usize>) -> Self {
        let id = id.to_string();
        let labels = [id.as_str()];
        THREAD_POOL_SIZE
            .with_label_values(&labels)
            .set(thread_pool_size.unwrap_or(0) as i64);
        let series = Series {
            submitted: TASKS_SUBMITTED.with_label_values(&labels),
            completed: TASKS_COMPLETED.with_label_values(&labels),
            failed: TASKS_FAILED.with_label_values(&labels),
            active: ACTIVE_TASKS.with_label_values(&labels),
            id,
        };
        Self {
            series: Arc::new(series),
        }
    }

    /// must be called before the job is handed to the backend, which may run it right away
    pub(crate) fn dispatched(&self) {
        self.series.active.inc();
    }

    pub(crate) fn accepted(&self) {
        self.series.submitted.inc();
    }

    pub(crate) fn rejected(&self) {
        self.series.active.dec();
    }

    pub(crate) fn finished(&self, success: bool) {
        self.series.completed.inc();
        if !success {
            self.series.failed.inc();
        }
        self.series.active.dec();
    }

    pub(crate) fn submitted_count(&self) -> u64 {
        self.series.submitted.get()
    }

    pub(crate) fn completed_count(&self) -> u64 {
        self.series.completed.get()
    }

    pub(crate) fn failed_count(&self) -> u64 {
        self.series.failed.get()
    }

    pub(crate) fn active_count(&self) -> u64 {
        self.series.active.get().max(0) as u64
    }
}
