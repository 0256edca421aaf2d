//! The scheduler: admits tasks through a [`BatchScaler`], submits them to an
//! [`Executor`], reaps completions, classifies failures through a
//! [`RetryPolicy`], and sweeps for stragglers.
//!
//! A spawn-and-reap loop with a retry/escalate pass each iteration and a
//! cancel-or-result wait, built around two admission paths -- see
//! [`RunState`].

mod run_state;

pub use run_state::{RunState, SubmissionId};

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::DispatchError;
use crate::executor::{EffectiveResources, Executor, Outcome};
use crate::retry::{Classification, DefaultRetryPolicy, RetryPolicy};
use crate::scaler::{AimdScaler, BatchScaler};
use crate::straggler::{RuntimeStats, StragglerContext, StragglerDetector};
use crate::task::Task;

/// A cloneable handle letting any task or thread request cancellation of a
/// run in progress. Built on `tokio_util::sync::CancellationToken`.
#[derive(Clone)]
pub struct CancellationHandle(CancellationToken);

impl CancellationHandle {
    pub fn new() -> Self {
        Self(CancellationToken::new())
    }

    /// Idempotent: cancelling an already-cancelled handle is a no-op.
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.0.clone()
    }
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for one [`Dispatcher::start_run`] invocation.
pub struct DispatchOptions<E: Executor> {
    pub scaler: Box<dyn BatchScaler>,
    pub retry_policy: Box<dyn RetryPolicy>,
    pub straggler: Option<Box<dyn StragglerDetector>>,
    pub executor: E,
    pub submit_jitter: Duration,
    pub cancel: CancellationHandle,
    /// How often the main loop re-checks for stragglers when nothing has
    /// completed in the meantime. Only consulted when `straggler` is set --
    /// without a detector the loop waits on `await_any` indefinitely.
    pub straggler_sweep_interval: Duration,
}

impl<E: Executor> DispatchOptions<E> {
    /// Builds options with the documented defaults: an `AimdScaler` sized to
    /// `input_len`, a `DefaultRetryPolicy`, no straggler detection, a 5ms
    /// submit jitter, and a fresh cancellation handle.
    pub fn with_defaults(executor: E, input_len: usize) -> Self {
        Self {
            scaler: Box::new(AimdScaler::with_defaults(input_len)),
            retry_policy: Box::new(DefaultRetryPolicy::default()),
            straggler: None,
            executor,
            submit_jitter: Duration::from_millis(5),
            cancel: CancellationHandle::new(),
            straggler_sweep_interval: Duration::from_millis(50),
        }
    }
}

/// The dispatch engine. Stateless itself -- all state for one run lives in
/// [`RunState`], owned locally by [`Dispatcher::start_run`].
pub struct Dispatcher;

impl Dispatcher {
    /// Runs `tasks` to completion against the given options, returning
    /// per-task values in input order, or the first fatal error.
    pub async fn start_run<E: Executor>(
        tasks: Vec<Task<E::Work>>,
        mut opts: DispatchOptions<E>,
    ) -> Result<Vec<E::Value>, DispatchError> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let mut state: RunState<E::Work, E::Value, E::Handle> = RunState::new(tasks);
        let mut stats = RuntimeStats::new();
        let cancel_token = opts.cancel.token();

        loop {
            if cancel_token.is_cancelled() {
                return Self::drain_on_cancel(&mut state, &opts.executor).await;
            }

            // Resubmission: retried and straggler-reclaimed tasks bypass
            // the scaler entirely.
            while let Some(task) = state.resubmit_queue.pop_front() {
                Self::submit(&mut state, &opts.executor, opts.submit_jitter, task).await?;
            }

            // Admission: only the original input is gated by the scaler.
            while opts.scaler.has_next() && state.admission_pending() {
                let batch = opts.scaler.next_batch();
                if batch.is_empty() {
                    break;
                }
                let batch_tasks = state.take_admission_batch(&batch);
                for task in batch_tasks {
                    Self::submit(&mut state, &opts.executor, opts.submit_jitter, task).await?;
                }
            }

            if !state.admission_pending()
                && state.resubmit_queue.is_empty()
                && state.inflight.is_empty()
            {
                break;
            }

            if state.inflight.is_empty() {
                continue;
            }

            let handles = state.inflight_handles();
            let reaped = tokio::select! {
                result = opts.executor.await_any(&handles, 1) => Some(result),
                _ = tokio::time::sleep(opts.straggler_sweep_interval), if opts.straggler.is_some() => None,
                _ = cancel_token.cancelled() => None,
            };

            // A `None` here means either the straggler sweep interval or
            // cancellation woke the loop with nothing reaped; either way
            // the top-of-loop checks pick up from here next iteration.
            for (handle, outcome) in reaped.map(|r| r.finished).unwrap_or_default() {
                let (_, task) = match state.remove_inflight(&handle) {
                    Some(entry) => entry,
                    None => {
                        return Err(DispatchError::InvariantViolation(format!(
                            "executor reported completion for an untracked handle: {handle:?}"
                        )));
                    }
                };
                Self::handle_outcome(
                    &mut state,
                    opts.scaler.as_mut(),
                    opts.retry_policy.as_ref(),
                    &mut stats,
                    task,
                    outcome,
                )?;
            }

            if let Some(detector) = opts.straggler.as_deref() {
                Self::sweep_stragglers(&mut state, &opts.executor, detector, &stats).await;
            }
        }

        Ok(state.into_results())
    }

    async fn submit<E: Executor>(
        state: &mut RunState<E::Work, E::Value, E::Handle>,
        executor: &E,
        jitter: Duration,
        mut task: Task<E::Work>,
    ) -> Result<(), DispatchError> {
        if jitter > Duration::ZERO {
            tokio::time::sleep(jitter).await;
        }

        let now = Instant::now();
        if task.first_submit_ts.is_none() {
            task.first_submit_ts = Some(now);
        }
        task.last_submit_ts = Some(now);

        let hints = EffectiveResources::from(&task.resources);
        let task_id = task.id;
        match executor.launch(&task.work, hints).await {
            Ok(handle) => {
                task.attempt += 1;
                debug!(task_id = %task_id, attempt = task.attempt, "submitted");
                state.insert_inflight(handle, task);
                Ok(())
            }
            Err(e) => Err(DispatchError::ExecutorUnavailable(e.to_string())),
        }
    }

    fn handle_outcome<W, V, H: Clone + Eq + std::hash::Hash>(
        state: &mut RunState<W, V, H>,
        scaler: &mut dyn BatchScaler,
        retry_policy: &dyn RetryPolicy,
        stats: &mut RuntimeStats,
        task: Task<W>,
        outcome: Outcome<V>,
    ) -> Result<(), DispatchError> {
        match outcome {
            Outcome::Success(value) => {
                let elapsed = task
                    .last_submit_ts
                    .map(|t| t.elapsed())
                    .unwrap_or_default();
                stats.record(elapsed);
                info!(task_id = %task.id, "completed");
                state.record_success(task.origin_index, value);
                scaler.mark_success();
                Ok(())
            }
            Outcome::Failure { kind, detail } => match retry_policy.classify(&kind) {
                Classification::NonRetryable => {
                    warn!(task_id = %task.id, %kind, "non-retryable failure");
                    Err(DispatchError::NonRetryable {
                        task_id: task.id,
                        cause: detail,
                    })
                }
                Classification::Retryable { kind } => {
                    let mut task = task;
                    let rule = match task.retry_table.get(&kind).copied() {
                        Some(rule) => rule,
                        None => {
                            warn!(task_id = %task.id, %kind, "kind not in task's retry_table");
                            return Err(DispatchError::NonRetryable {
                                task_id: task.id,
                                cause: detail,
                            });
                        }
                    };
                    if task.attempt >= rule.max_attempts {
                        warn!(task_id = %task.id, %kind, attempts = task.attempt, "retries exhausted");
                        return Err(DispatchError::RetriesExhausted {
                            task_id: task.id,
                            attempts: task.attempt,
                            cause: detail,
                        });
                    }
                    if rule.memory_multiplier > 1.0 {
                        if let Some(mem) = task.resources.memory {
                            task.resources.memory =
                                Some((mem as f64 * rule.memory_multiplier).round() as u64);
                        }
                    }
                    debug!(task_id = %task.id, %kind, attempt = task.attempt, "retrying");
                    scaler.mark_failure();
                    state.resubmit_queue.push_back(task);
                    Ok(())
                }
            },
        }
    }

    async fn sweep_stragglers<E: Executor>(
        state: &mut RunState<E::Work, E::Value, E::Handle>,
        executor: &E,
        detector: &dyn StragglerDetector,
        stats: &RuntimeStats,
    ) {
        let now = Instant::now();
        let ctx = StragglerContext { now, stats };
        let stragglers: Vec<E::Handle> = state
            .inflight_snapshots()
            .into_iter()
            .filter(|(_, snapshot)| detector.is_straggler(snapshot, &ctx))
            .map(|(handle, _)| handle)
            .collect();

        for handle in stragglers {
            executor.cancel(&handle).await;
            if let Some((_, task)) = state.remove_inflight(&handle) {
                warn!(task_id = %task.id, "reclaimed as straggler");
                state.resubmit_queue.push_back(task);
            }
        }
    }

    async fn drain_on_cancel<E: Executor>(
        state: &mut RunState<E::Work, E::Value, E::Handle>,
        executor: &E,
    ) -> Result<Vec<E::Value>, DispatchError> {
        let inflight_at_cancel = state.inflight.len();
        let handles: Vec<E::Handle> = state.inflight_handles();
        for handle in &handles {
            executor.cancel(handle).await;
        }
        let completed = state.completed_count();
        info!(
            completed,
            inflight_at_cancel, "run cancelled, drained in-flight work"
        );
        Err(DispatchError::Cancelled {
            completed,
            inflight_at_cancel,
        })
    }
}
