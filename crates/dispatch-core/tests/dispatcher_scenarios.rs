//! End-to-end scenarios run against the in-memory `FakeExecutor`.

use std::time::Duration;

use dispatch_core::dispatcher::{CancellationHandle, DispatchOptions, Dispatcher};
use dispatch_core::retry::DefaultRetryPolicy;
use dispatch_core::scaler::AimdScaler;
use dispatch_core::straggler::DeadlineStraggler;
use dispatch_core::task::{ResourceHints, RetryRule, Task, TaskId};
use dispatch_core::DispatchError;
use dispatch_test_utils::{FakeExecutor, ScriptedJob, ScriptedOutcome};

fn task(id: u64, job: std::sync::Arc<ScriptedJob<i64>>) -> Task<std::sync::Arc<ScriptedJob<i64>>> {
    Task::new(TaskId(id), job)
}

#[tokio::test]
async fn all_success_returns_values_in_input_order() {
    let tasks: Vec<_> = [10i64, 20, 30, 40, 50]
        .into_iter()
        .enumerate()
        .map(|(i, v)| task(i as u64, ScriptedJob::always_succeeds(v)))
        .collect();

    let executor = FakeExecutor::new();
    let mut opts = DispatchOptions::with_defaults(executor, tasks.len());
    opts.scaler = Box::new(AimdScaler::new(2, 4, 1, 1, 0.5, tasks.len()));
    opts.submit_jitter = Duration::ZERO;

    let results = Dispatcher::start_run(tasks, opts).await.unwrap();
    assert_eq!(results, vec![10, 20, 30, 40, 50]);
}

#[tokio::test]
async fn empty_input_returns_immediately_without_touching_executor() {
    let executor = FakeExecutor::<i64>::new();
    let opts = DispatchOptions::with_defaults(executor, 0);
    let results = Dispatcher::start_run(Vec::new(), opts).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn retryable_failure_escalates_memory_and_succeeds_on_retry() {
    let job = ScriptedJob::new(vec![
        ScriptedOutcome::failure("rate_limited", "slow down"),
        ScriptedOutcome::Success(99i64),
    ]);
    let mut t = task(0, job);
    t.resources = ResourceHints {
        memory: Some(1000),
        ..Default::default()
    };
    t = t.with_retry_rule("rate_limited", RetryRule::new(2, 1.5));

    let executor = FakeExecutor::new();
    let mut opts = DispatchOptions::with_defaults(executor, 1);
    opts.submit_jitter = Duration::ZERO;

    let results = Dispatcher::start_run(vec![t], opts).await.unwrap();
    assert_eq!(results, vec![99]);
}

#[tokio::test]
async fn retries_exhausted_is_fatal() {
    let job = ScriptedJob::new(vec![ScriptedOutcome::failure("rate_limited", "still slow")]);
    let t = task(0, job).with_retry_rule("rate_limited", RetryRule::new(2, 1.0));

    let executor = FakeExecutor::new();
    let mut opts = DispatchOptions::with_defaults(executor, 1);
    opts.submit_jitter = Duration::ZERO;

    let err = Dispatcher::start_run(vec![t], opts).await.unwrap_err();
    match err {
        DispatchError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn non_retryable_failure_is_fatal_on_first_attempt() {
    let job = ScriptedJob::new(vec![ScriptedOutcome::failure(
        "permission_denied",
        "nope",
    )]);
    let t = task(0, job);

    let executor = FakeExecutor::new();
    let mut opts = DispatchOptions::with_defaults(executor, 1);
    opts.submit_jitter = Duration::ZERO;
    opts.retry_policy = Box::new(DefaultRetryPolicy::default());

    let err = Dispatcher::start_run(vec![t], opts).await.unwrap_err();
    assert!(matches!(err, DispatchError::NonRetryable { .. }));
}

#[tokio::test]
async fn retryable_kind_absent_from_task_retry_table_is_fatal() {
    // "rate_limited" is a kind the default policy recognizes in principle,
    // but this task never registered a rule for it, so it must fail
    // immediately rather than fall back to some policy-level default.
    let job = ScriptedJob::new(vec![ScriptedOutcome::failure("rate_limited", "slow down")]);
    let t = task(0, job);

    let executor = FakeExecutor::new();
    let mut opts = DispatchOptions::with_defaults(executor, 1);
    opts.submit_jitter = Duration::ZERO;

    let err = Dispatcher::start_run(vec![t], opts).await.unwrap_err();
    assert!(matches!(err, DispatchError::NonRetryable { .. }));
}

#[tokio::test]
async fn straggler_is_reclaimed_without_losing_retry_budget() {
    let straggler_job = ScriptedJob::with_delay(
        vec![ScriptedOutcome::Success(1i64), ScriptedOutcome::Success(2i64)],
        Duration::from_millis(200),
    );
    let fast_job = ScriptedJob::always_succeeds(7i64);

    let tasks = vec![task(0, straggler_job), task(1, fast_job)];

    let executor = FakeExecutor::new();
    let mut opts = DispatchOptions::with_defaults(executor, tasks.len());
    opts.submit_jitter = Duration::ZERO;
    opts.straggler = Some(Box::new(DeadlineStraggler::new(Duration::from_millis(20))));
    opts.straggler_sweep_interval = Duration::from_millis(5);

    let results = Dispatcher::start_run(tasks, opts).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1], 7);
}

#[tokio::test]
async fn cancellation_mid_run_drains_inflight_and_returns_counts() {
    let job = ScriptedJob::with_delay(vec![ScriptedOutcome::Success(1i64)], Duration::from_secs(30));
    let tasks: Vec<_> = (0..3).map(|i| task(i, job.clone())).collect();

    let executor = FakeExecutor::new();
    let cancel = CancellationHandle::new();
    let mut opts = DispatchOptions::with_defaults(executor, tasks.len());
    opts.scaler = Box::new(AimdScaler::new(3, 3, 1, 1, 0.5, tasks.len()));
    opts.submit_jitter = Duration::ZERO;
    opts.cancel = cancel.clone();

    let cancel_after = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel_after.cancel();
    });

    let err = Dispatcher::start_run(tasks, opts).await.unwrap_err();
    match err {
        DispatchError::Cancelled {
            inflight_at_cancel, ..
        } => assert_eq!(inflight_at_cancel, 3),
        other => panic!("expected Cancelled, got {other:?}"),
    }
}
