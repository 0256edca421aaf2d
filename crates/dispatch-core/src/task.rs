//! The unit of work the [`Dispatcher`](crate::dispatcher::Dispatcher) schedules.

use std::collections::HashMap;
use std::time::Instant;

/// Identifies a [`Task`] for telemetry and error reporting.
///
/// Not used as an in-flight lookup key -- that's what
/// [`SubmissionId`](crate::dispatcher::SubmissionId) is for. Duplicate
/// `TaskId`s in one run's input are permitted and treated as independent
/// tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Resource hints attached to a task's submission. Any field may be absent;
/// an absent field is never escalated or interpreted by the Dispatcher
/// itself -- it's passed through to the [`Executor`](crate::executor::Executor)
/// as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceHints {
    pub memory: Option<u64>,
    pub cpus: Option<u32>,
    pub placement_group: Option<String>,
}

/// The retry behavior for one error kind: how many total attempts are
/// allowed, and how much to multiply `memory` by before each retry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryRule {
    pub max_attempts: u32,
    pub memory_multiplier: f64,
}

impl RetryRule {
    pub fn new(max_attempts: u32, memory_multiplier: f64) -> Self {
        Self {
            max_attempts,
            memory_multiplier,
        }
    }
}

/// A unit of work submitted to the Dispatcher.
///
/// `work` is opaque to the Dispatcher: it is handed to the
/// [`Executor`](crate::executor::Executor) verbatim and never inspected.
#[derive(Debug, Clone)]
pub struct Task<W> {
    pub id: TaskId,
    pub work: W,
    pub resources: ResourceHints,
    pub retry_table: HashMap<String, RetryRule>,
    pub(crate) attempt: u32,
    pub(crate) first_submit_ts: Option<Instant>,
    pub(crate) last_submit_ts: Option<Instant>,
    pub(crate) origin_index: usize,
}

impl<W> Task<W> {
    pub fn new(id: TaskId, work: W) -> Self {
        Self {
            id,
            work,
            resources: ResourceHints::default(),
            retry_table: HashMap::new(),
            attempt: 0,
            first_submit_ts: None,
            last_submit_ts: None,
            origin_index: 0,
        }
    }

    pub fn with_resources(mut self, resources: ResourceHints) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_retry_rule(mut self, kind: impl Into<String>, rule: RetryRule) -> Self {
        self.retry_table.insert(kind.into(), rule);
        self
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Highest `max_attempts` recorded across every kind this task has seen
    /// so far -- the bound the invariant in the testable properties is
    /// stated against.
    pub fn max_attempts_seen(&self) -> u32 {
        self.retry_table
            .values()
            .map(|r| r.max_attempts)
            .max()
            .unwrap_or(1)
    }
}

/// A lightweight, non-generic view of a running task, handed to
/// [`StragglerDetector`](crate::straggler::StragglerDetector) implementations
/// so they never need to be generic over the task's work/value types.
#[derive(Debug, Clone, Copy)]
pub struct TaskSnapshot {
    pub task_id: TaskId,
    pub attempt: u32,
    pub first_submit_ts: Instant,
    pub last_submit_ts: Instant,
}

impl<W> Task<W> {
    pub(crate) fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            task_id: self.id,
            attempt: self.attempt,
            first_submit_ts: self.first_submit_ts.expect("task must be in flight"),
            last_submit_ts: self.last_submit_ts.expect("task must be in flight"),
        }
    }
}
