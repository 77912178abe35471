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

//! Combinators derive new promises from existing ones. No combinator ever mutates its input
//! promises, and combinator construction never blocks.
//!
//! Each single input combinator comes in 2 forms:
//! - `then_apply(f)` runs `f` on whichever thread settles the upstream promise
//! - `then_apply_async(handoff, f)` hands `f` off to an executor, see [Handoff](../handoff/enum.Handoff.html)
//!
//! ## Failure propagation
//! - failures pass through `then_apply`, `then_try_apply`, `then_accept` and `then_compose`
//!   unchanged, and their functions are never invoked
//! - `exceptionally` and `handle` are the only combinators that turn a failure back into a value
//! - `when_complete` observes the outcome. If the observer fails, then the failure overrides a
//!   successful upstream outcome.
//! - a panic in any combinator function fails the derived promise
//! - if the handoff executor rejects the continuation, then the derived promise fails with the
//!   [ExecutorError](../execution/enum.ExecutorError.html)
//!
//! ## Joins
//! - [join2](fn.join2.html), [join3](fn.join3.html) and [join_all](fn.join_all.html) collect values
//!   and fail as soon as any input fails
//! - [all_of](fn.all_of.html) is a signal only join over promises of any value type. It waits for
//!   every input to settle, and then fails with the first failure that was observed.
//! - [any_of](fn.any_of.html) settles with whichever input settles first

use crate::{
    concurrent::{
        handoff::Handoff,
        promise::{Outcome, Promise, Settle},
    },
    errors::{CombinatorError, TaskFailure},
    task::guarded,
};
use parking_lot::Mutex;
use std::sync::Arc;
use vow_log::*;

impl<T> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Delivers the settled outcome to `f` according to the handoff policy.
    /// If the executor rejects `f`, then `downstream` is failed instead.
    fn on_settled_via<U, F>(&self, handoff: Handoff, downstream: &Promise<U>, f: F)
    where
        U: Send + Sync + 'static,
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        let downstream = downstream.clone();
        self.subscribe(move |outcome| {
            let outcome = outcome.clone();
            if let Err(err) = handoff.run(move || f(outcome)) {
                downstream.complete_exceptionally(err);
            }
        });
    }

    fn derive<U, F>(&self, handoff: Handoff, f: F) -> Promise<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(Outcome<T>) -> Outcome<U> + Send + 'static,
    {
        let downstream = Promise::new();
        let target = downstream.clone();
        self.on_settled_via(handoff, &downstream, move |outcome| {
            target.settle(guarded(|| f(outcome)));
        });
        downstream
    }

    /// Transform: returns a promise that completes with `f(value)`.
    pub fn then_apply<U, F>(&self, f: F) -> Promise<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.then_apply_async(Handoff::CompletingThread, f)
    }

    /// Transform, with `f` handed off per the handoff policy
    pub fn then_apply_async<U, F>(&self, handoff: impl Into<Handoff>, f: F) -> Promise<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.derive(handoff.into(), move |outcome| outcome.map(f))
    }

    /// Transform with a fallible function. An error returned by `f` fails the derived promise.
    pub fn then_try_apply<U, F>(&self, f: F) -> Promise<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(T) -> Result<U, failure::Error> + Send + 'static,
    {
        self.then_try_apply_async(Handoff::CompletingThread, f)
    }

    /// Fallible transform, with `f` handed off per the handoff policy
    pub fn then_try_apply_async<U, F>(&self, handoff: impl Into<Handoff>, f: F) -> Promise<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(T) -> Result<U, failure::Error> + Send + 'static,
    {
        self.derive(handoff.into(), move |outcome| {
            outcome.and_then(|value| f(value).map_err(TaskFailure::from))
        })
    }

    /// Consume: the derived promise only carries the completion signal.
    pub fn then_accept<F>(&self, f: F) -> Promise<()>
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.then_apply(f)
    }

    /// Consume, with `f` handed off per the handoff policy
    pub fn then_accept_async<F>(&self, handoff: impl Into<Handoff>, f: F) -> Promise<()>
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.then_apply_async(handoff, f)
    }

    /// Chain: `f` produces the next stage, and the derived promise settles with it.
    ///
    /// Fail fast: if this promise fails, then `f` is never invoked, so the next stage is never started.
    pub fn then_compose<U, F>(&self, f: F) -> Promise<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Promise<U> + Send + 'static,
    {
        self.then_compose_async(Handoff::CompletingThread, f)
    }

    /// Chain, with `f` handed off per the handoff policy
    pub fn then_compose_async<U, F>(&self, handoff: impl Into<Handoff>, f: F) -> Promise<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Promise<U> + Send + 'static,
    {
        let downstream = Promise::new();
        let target = downstream.clone();
        self.on_settled_via(handoff.into(), &downstream, move |outcome| {
            match outcome.and_then(|value| guarded(|| Ok(f(value)))) {
                Ok(next_stage) => next_stage.subscribe(move |outcome| {
                    target.settle(outcome.clone());
                }),
                Err(failure) => {
                    target.settle(Err(failure));
                }
            }
        });
        downstream
    }

    /// Combine-Pair: completes with `f(a, b)` once both promises complete. Fails as soon as either
    /// promise fails.
    pub fn then_combine<U, V, F>(&self, other: &Promise<U>, f: F) -> Promise<V>
    where
        U: Clone + Send + Sync + 'static,
        V: Send + Sync + 'static,
        F: FnOnce(T, U) -> V + Send + 'static,
    {
        self.then_combine_async(other, Handoff::CompletingThread, f)
    }

    /// Combine-Pair, with `f` handed off per the handoff policy
    pub fn then_combine_async<U, V, F>(
        &self,
        other: &Promise<U>,
        handoff: impl Into<Handoff>,
        f: F,
    ) -> Promise<V>
    where
        U: Clone + Send + Sync + 'static,
        V: Send + Sync + 'static,
        F: FnOnce(T, U) -> V + Send + 'static,
    {
        join2(self, other).then_apply_async(handoff, move |(a, b)| f(a, b))
    }

    /// Recover: a failure is replaced by `f(failure)`. `f` is not invoked on success.
    pub fn exceptionally<F>(&self, f: F) -> Promise<T>
    where
        F: FnOnce(TaskFailure) -> T + Send + 'static,
    {
        self.exceptionally_async(Handoff::CompletingThread, f)
    }

    /// Recover, with `f` handed off per the handoff policy
    pub fn exceptionally_async<F>(&self, handoff: impl Into<Handoff>, f: F) -> Promise<T>
    where
        F: FnOnce(TaskFailure) -> T + Send + 'static,
    {
        self.derive(handoff.into(), move |outcome| {
            outcome.or_else(|failure| {
                debug!("recovering from failure: {}", failure);
                Ok(f(failure))
            })
        })
    }

    /// Handle: `f` is always invoked with the outcome, and the derived promise completes with
    /// whatever it returns.
    pub fn handle<U, F>(&self, f: F) -> Promise<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(Outcome<T>) -> U + Send + 'static,
    {
        self.handle_async(Handoff::CompletingThread, f)
    }

    /// Handle, with `f` handed off per the handoff policy
    pub fn handle_async<U, F>(&self, handoff: impl Into<Handoff>, f: F) -> Promise<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(Outcome<T>) -> U + Send + 'static,
    {
        self.derive(handoff.into(), move |outcome| Ok(f(outcome)))
    }

    /// Observe: `f` sees the outcome, and the derived promise settles with the same outcome.
    ///
    /// If `f` returns an error or panics, then the derived promise fails with that failure, even
    /// if this promise completed successfully. If this promise failed, then its failure is kept.
    pub fn when_complete<F>(&self, f: F) -> Promise<T>
    where
        F: FnOnce(&Outcome<T>) -> Result<(), failure::Error> + Send + 'static,
    {
        self.when_complete_async(Handoff::CompletingThread, f)
    }

    /// Observe, with `f` handed off per the handoff policy
    pub fn when_complete_async<F>(&self, handoff: impl Into<Handoff>, f: F) -> Promise<T>
    where
        F: FnOnce(&Outcome<T>) -> Result<(), failure::Error> + Send + 'static,
    {
        self.derive(handoff.into(), move |outcome| {
            match guarded(|| f(&outcome).map_err(TaskFailure::from)) {
                Err(failure) if outcome.is_ok() => {
                    debug!("observer failure overrides the successful outcome: {}", failure);
                    Err(failure)
                }
                _ => outcome,
            }
        })
    }
}

fn pair<A: Clone, B: Clone>(slots: &(Option<A>, Option<B>)) -> Option<(A, B)> {
    match slots {
        (Some(a), Some(b)) => Some((a.clone(), b.clone())),
        _ => None,
    }
}

/// Completes with both values once both promises complete. Fails as soon as either fails.
pub fn join2<A, B>(a: &Promise<A>, b: &Promise<B>) -> Promise<(A, B)>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    let joined = Promise::new();
    let slots = Arc::new(Mutex::new((None, None)));
    {
        let (joined, slots) = (joined.clone(), Arc::clone(&slots));
        a.subscribe(move |outcome| match outcome {
            Ok(value) => {
                let ready = {
                    let mut slots = slots.lock();
                    slots.0 = Some(value.clone());
                    pair(&slots)
                };
                if let Some(values) = ready {
                    joined.complete(values);
                }
            }
            Err(failure) => {
                joined.complete_exceptionally(failure.clone());
            }
        });
    }
    {
        let joined = joined.clone();
        b.subscribe(move |outcome| match outcome {
            Ok(value) => {
                let ready = {
                    let mut slots = slots.lock();
                    slots.1 = Some(value.clone());
                    pair(&slots)
                };
                if let Some(values) = ready {
                    joined.complete(values);
                }
            }
            Err(failure) => {
                joined.complete_exceptionally(failure.clone());
            }
        });
    }
    joined
}

/// Completes with all 3 values once they all complete. Fails as soon as any fails.
pub fn join3<A, B, C>(a: &Promise<A>, b: &Promise<B>, c: &Promise<C>) -> Promise<(A, B, C)>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    join2(&join2(a, b), c).then_apply(|((a, b), c)| (a, b, c))
}

/// Completes with the values in input order once every promise completes. Fails as soon as any
/// promise fails. Completes immediately with an empty Vec if there are no promises.
pub fn join_all<T>(promises: &[Promise<T>]) -> Promise<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    if promises.is_empty() {
        return Promise::completed(Vec::new());
    }
    let joined = Promise::new();
    let slots: Arc<Mutex<(usize, Vec<Option<T>>)>> =
        Arc::new(Mutex::new((promises.len(), vec![None; promises.len()])));
    for (i, promise) in promises.iter().enumerate() {
        let (joined, slots) = (joined.clone(), Arc::clone(&slots));
        promise.subscribe(move |outcome| match outcome {
            Ok(value) => {
                let values = {
                    let mut slots = slots.lock();
                    let (remaining, values) = &mut *slots;
                    values[i] = Some(value.clone());
                    *remaining -= 1;
                    if *remaining == 0 {
                        values.drain(..).collect::<Option<Vec<T>>>()
                    } else {
                        None
                    }
                };
                if let Some(values) = values {
                    joined.complete(values);
                }
            }
            Err(failure) => {
                joined.complete_exceptionally(failure.clone());
            }
        });
    }
    joined
}

/// Join-All: a signal only promise that settles once every input has settled. Inputs may have
/// different value types. If any input failed, then it fails with the first failure that was
/// observed. Completes immediately if there are no inputs.
///
/// The values are retrieved from the input promises themselves.
///
/// ```
/// use vow::{all_of, Promise, Settle};
///
/// let count = Promise::completed(3_usize);
/// let name = Promise::completed("quotation".to_string());
/// all_of(&[&count as &dyn Settle, &name]).get().unwrap();
/// assert_eq!(count.get().unwrap(), 3);
/// ```
pub fn all_of(promises: &[&dyn Settle]) -> Promise<()> {
    if promises.is_empty() {
        return Promise::completed(());
    }
    let joined = Promise::new();
    let state: Arc<Mutex<(usize, Option<TaskFailure>)>> =
        Arc::new(Mutex::new((promises.len(), None)));
    for promise in promises {
        let (joined, state) = (joined.clone(), Arc::clone(&state));
        promise.on_settled(Box::new(move |failure| {
            let settled = {
                let mut state = state.lock();
                let (remaining, first_failure) = &mut *state;
                if first_failure.is_none() {
                    *first_failure = failure;
                }
                *remaining -= 1;
                if *remaining == 0 {
                    Some(first_failure.take())
                } else {
                    None
                }
            };
            match settled {
                Some(None) => {
                    joined.complete(());
                }
                Some(Some(failure)) => {
                    joined.complete_exceptionally(failure);
                }
                None => {}
            }
        }));
    }
    joined
}

/// Race-Any: settles with the outcome of whichever promise settles first, value or failure.
/// Fails with `CombinatorError::NoInputs` if there are no promises.
pub fn any_of<T>(promises: &[Promise<T>]) -> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    if promises.is_empty() {
        return Promise::failed(CombinatorError::NoInputs);
    }
    let winner = Promise::new();
    for promise in promises {
        let winner = winner.clone();
        promise.subscribe(move |outcome| {
            winner.settle(outcome.clone());
        });
    }
    winner
}

#[allow(warnings)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        concurrent::execution::{self, ExecutorBuilder, ExecutorId, ExecutorKind},
        configure_logging,
        errors::ExecutionError,
        task::Task,
    };
    use failure::Fail;
    use std::{
        sync::atomic::{AtomicBool, AtomicUsize, Ordering},
        thread,
        time::Duration,
    };

    #[derive(Fail, Debug, Clone, PartialEq)]
    #[fail(display = "no quotation available")]
    struct NoQuotation;

    fn no_quotation() -> Promise<u32> {
        Promise::failed(TaskFailure::new(NoQuotation))
    }

    fn single_thread_executor() -> execution::Executor {
        ExecutorBuilder::new(ExecutorId::generate())
            .set_kind(ExecutorKind::SingleThread)
            .build()
            .unwrap()
    }

    #[test]
    fn then_apply_transforms_the_value() {
        configure_logging();

        let promise = Promise::new();
        let doubled = promise.then_apply(|n: u32| n * 2).then_apply(|n| n.to_string());
        assert!(!doubled.is_done());
        promise.complete(21);
        assert_eq!(doubled.get().unwrap(), "42");
    }

    #[test]
    fn long_then_apply_chain_settles_without_exhausting_the_stack() {
        configure_logging();

        let root = Promise::new();
        let mut chain = root.clone();
        for _ in 0..20_000 {
            chain = chain.then_apply(|n: u32| n + 1);
        }
        root.complete(0);
        assert_eq!(chain.get().unwrap(), 20_000);
    }

    #[test]
    fn then_apply_skips_on_failure() {
        configure_logging();

        let invoked = Arc::new(AtomicBool::new(false));
        let transformed = {
            let invoked = Arc::clone(&invoked);
            no_quotation().then_apply(move |n| {
                invoked.store(true, Ordering::SeqCst);
                n + 1
            })
        };
        let err = transformed.get().unwrap_err();
        assert!(err.failure().unwrap().downcast_ref::<NoQuotation>().is_some());
        assert!(!invoked.load(Ordering::SeqCst));
    }

    #[test]
    fn then_apply_captures_panics() {
        configure_logging();

        let transformed = Promise::completed(1).then_apply(|_| -> u32 { panic!("BOOM!!!") });
        assert!(transformed.get().unwrap_err().failure().unwrap().is_panic());
    }

    #[test]
    fn then_try_apply_fails_on_error() {
        configure_logging();

        let parsed = Promise::completed("12".to_string())
            .then_try_apply(|s| Ok(s.parse::<u32>()?));
        assert_eq!(parsed.get().unwrap(), 12);

        let parsed = Promise::completed("twelve".to_string())
            .then_try_apply(|s| Ok(s.parse::<u32>()?));
        let err = parsed.get().unwrap_err();
        assert!(err
            .failure()
            .unwrap()
            .downcast_ref::<std::num::ParseIntError>()
            .is_some());
    }

    #[test]
    fn then_accept_signals_completion() {
        configure_logging();

        let total = Arc::new(AtomicUsize::new(0));
        let accepted = {
            let total = Arc::clone(&total);
            Promise::completed(5_usize).then_accept(move |n| {
                total.fetch_add(n, Ordering::SeqCst);
            })
        };
        accepted.get().unwrap();
        assert_eq!(total.load(Ordering::SeqCst), 5);
        assert!(no_quotation().then_accept(|_| {}).get().is_err());
    }

    #[test]
    fn then_compose_chains_the_next_stage() {
        configure_logging();

        let quotation = execution::supply_async(Task::supplier(|| 100_u32)).unwrap();
        let total = quotation.then_compose(|price| {
            execution::supply_async(Task::supplier(move || price + 20)).unwrap()
        });
        assert_eq!(total.get().unwrap(), 120);
    }

    #[test]
    fn then_compose_fails_fast() {
        configure_logging();

        let second_stage_started = Arc::new(AtomicBool::new(false));
        let chained = {
            let second_stage_started = Arc::clone(&second_stage_started);
            no_quotation().then_compose(move |_| {
                second_stage_started.store(true, Ordering::SeqCst);
                Promise::<u32>::failed(failure::err_msg("second stage failed"))
            })
        };
        let err = chained.get().unwrap_err();
        assert!(err.failure().unwrap().downcast_ref::<NoQuotation>().is_some());
        assert!(!second_stage_started.load(Ordering::SeqCst));
    }

    #[test]
    fn then_compose_propagates_inner_failure() {
        configure_logging();

        let chained = Promise::completed(1_u32).then_compose(|_| no_quotation());
        let err = chained.get().unwrap_err();
        assert!(err.failure().unwrap().downcast_ref::<NoQuotation>().is_some());
    }

    #[test]
    fn then_combine_pairs_values() {
        configure_logging();

        let price = Promise::new();
        let exchange_rate = Promise::new();
        let converted = price.then_combine(&exchange_rate, |price: u32, rate: f64| {
            f64::from(price) * rate
        });
        exchange_rate.complete(0.5);
        assert!(!converted.is_done());
        price.complete(100);
        assert_eq!(converted.get().unwrap(), 50.0);
    }

    #[test]
    fn then_combine_fails_as_soon_as_either_fails() {
        configure_logging();

        let never_settled = Promise::<u32>::new();
        let combined = never_settled.then_combine(&no_quotation(), |a, b| a + b);
        assert!(combined.is_completed_exceptionally());
    }

    #[test]
    fn exceptionally_recovers() {
        configure_logging();

        let recovered = no_quotation().exceptionally(|failure| {
            assert!(failure.downcast_ref::<NoQuotation>().is_some());
            0
        });
        assert_eq!(recovered.get().unwrap(), 0);

        let unchanged = Promise::completed(7_u32).exceptionally(|_| panic!("must not be invoked"));
        assert_eq!(unchanged.get().unwrap(), 7);
    }

    #[test]
    fn handle_sees_both_channels() {
        configure_logging();

        let describe = |outcome: Outcome<u32>| match outcome {
            Ok(n) => format!("value: {}", n),
            Err(failure) => format!("failure: {}", failure),
        };
        assert_eq!(
            Promise::completed(3_u32).handle(describe).get().unwrap(),
            "value: 3"
        );
        assert_eq!(
            no_quotation().handle(describe).get().unwrap(),
            "failure: no quotation available"
        );
    }

    #[test]
    fn when_complete_observes_without_changing_the_outcome() {
        configure_logging();

        let observed = Arc::new(AtomicUsize::new(0));
        let promise = {
            let observed = Arc::clone(&observed);
            Promise::completed(9_u32).when_complete(move |outcome| {
                observed.store(*outcome.as_ref().unwrap() as usize, Ordering::SeqCst);
                Ok(())
            })
        };
        assert_eq!(promise.get().unwrap(), 9);
        assert_eq!(observed.load(Ordering::SeqCst), 9);
    }

    #[test]
    fn when_complete_failure_overrides_success() {
        configure_logging();

        let promise = Promise::completed(9_u32)
            .when_complete(|_| Err(failure::err_msg("observer failed")));
        let err = promise.get().unwrap_err();
        assert_eq!(err.failure().unwrap().to_string(), "observer failed");

        let promise = Promise::completed(9_u32).when_complete(|_| panic!("observer panicked"));
        assert!(promise.get().unwrap_err().failure().unwrap().is_panic());
    }

    #[test]
    fn when_complete_keeps_upstream_failure() {
        configure_logging();

        let promise = no_quotation().when_complete(|_| Err(failure::err_msg("observer failed")));
        let err = promise.get().unwrap_err();
        assert!(err.failure().unwrap().downcast_ref::<NoQuotation>().is_some());
    }

    #[test]
    fn async_forms_hop_to_the_executor() {
        configure_logging();

        let executor = single_thread_executor();
        let executor_thread_prefix = executor.id().to_string();
        let current_thread = |_: u32| thread::current().name().map(str::to_string);

        // already settled promises still hand off
        let thread_name = Promise::completed(1)
            .then_apply_async(&executor, current_thread)
            .get()
            .unwrap()
            .unwrap();
        assert!(thread_name.starts_with(&executor_thread_prefix));

        let promise = Promise::new();
        let derived = promise.then_apply_async(&executor, current_thread);
        promise.complete(1);
        assert!(derived
            .get()
            .unwrap()
            .unwrap()
            .starts_with(&executor_thread_prefix));

        let thread_name = no_quotation()
            .exceptionally_async(&executor, |_| 0)
            .then_apply(current_thread)
            .get()
            .unwrap()
            .unwrap();
        assert!(thread_name.starts_with(&executor_thread_prefix));

        let thread_name = Promise::completed(1)
            .then_apply_async(Handoff::DefaultExecutor, current_thread)
            .get()
            .unwrap()
            .unwrap();
        assert!(thread_name.starts_with(&execution::Executor::GLOBAL_EXECUTOR_ID.to_string()));
    }

    #[test]
    fn rejected_handoff_fails_the_derived_promise() {
        configure_logging();

        let executor = single_thread_executor();
        executor.shutdown();
        let derived = Promise::completed(1_u32).then_apply_async(&executor, |n| n + 1);
        let err = derived.get().unwrap_err();
        match err.failure().unwrap().downcast_ref::<execution::ExecutorError>() {
            Some(execution::ExecutorError::Shutdown(id)) => assert_eq!(*id, executor.id()),
            other => panic!("expected ExecutorError::Shutdown: {:?}", other),
        }
    }

    #[test]
    fn join_all_collects_values_in_input_order() {
        configure_logging();

        let promises: Vec<Promise<u64>> = (0..10_u64)
            .map(|i| {
                execution::supply_async(Task::supplier(move || {
                    thread::sleep(Duration::from_millis(10 - i));
                    i
                }))
                .unwrap()
            })
            .collect();
        assert_eq!(
            join_all(&promises).get().unwrap(),
            (0..10).collect::<Vec<_>>()
        );
        assert!(join_all::<u32>(&[]).get().unwrap().is_empty());
    }

    #[test]
    fn join_all_fails_fast() {
        configure_logging();

        let joined = join_all(&[Promise::new(), no_quotation()]);
        assert!(joined.is_completed_exceptionally());
    }

    #[test]
    fn join3_collects_heterogeneous_values() {
        configure_logging();

        let joined = join3(
            &Promise::completed(1_u8),
            &Promise::completed("two".to_string()),
            &Promise::completed(3.0_f32),
        );
        assert_eq!(joined.get().unwrap(), (1, "two".to_string(), 3.0));
    }

    #[test]
    fn all_of_waits_for_every_input() {
        configure_logging();

        let a = Promise::<u32>::new();
        let b = Promise::<String>::new();
        let c = Promise::<u64>::new();
        let joined = all_of(&[&a as &dyn Settle, &b, &c]);
        a.complete(1);
        b.complete("2".to_string());
        assert!(!joined.is_done());
        c.complete(3);
        joined.get().unwrap();
        assert_eq!(a.get().unwrap(), 1);
        assert_eq!(b.get().unwrap(), "2");
        assert_eq!(c.get().unwrap(), 3);

        assert!(all_of(&[]).get().is_ok());
    }

    #[test]
    fn all_of_fails_with_the_first_failure_after_all_settle() {
        configure_logging();

        let a = Promise::<u32>::new();
        let b = Promise::<u32>::new();
        let c = Promise::<u32>::new();
        let joined = all_of(&[&a as &dyn Settle, &b, &c]);
        b.complete_exceptionally(TaskFailure::new(NoQuotation));
        a.complete(1);
        assert!(!joined.is_done());
        c.complete_exceptionally(failure::err_msg("late failure"));
        let err = joined.get().unwrap_err();
        assert!(err.failure().unwrap().downcast_ref::<NoQuotation>().is_some());
    }

    #[test]
    fn any_of_settles_with_the_first() {
        configure_logging();

        let a = Promise::new();
        let b = Promise::new();
        let winner = any_of(&[a.clone(), b.clone()]);
        assert!(!winner.is_done());
        b.complete(2_u32);
        a.complete(1_u32);
        assert_eq!(winner.get().unwrap(), 2);

        let a = Promise::<u32>::new();
        let winner = any_of(&[a.clone(), no_quotation()]);
        assert!(winner.is_completed_exceptionally());
    }

    #[test]
    fn any_of_without_inputs_fails() {
        let err = any_of::<u32>(&[]).get().unwrap_err();
        match err.failure().unwrap().downcast_ref::<CombinatorError>() {
            Some(CombinatorError::NoInputs) => {}
            other => panic!("expected CombinatorError::NoInputs: {:?}", other),
        }
    }
}
