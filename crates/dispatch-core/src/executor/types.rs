//! Plain data exchanged across the [`Executor`](super::Executor) boundary.

use crate::task::ResourceHints;
use thiserror::Error;

/// Resource hints with absent fields dropped, built from a task's
/// [`ResourceHints`] right before submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveResources {
    pub memory: Option<u64>,
    pub cpus: Option<u32>,
    pub placement_group: Option<String>,
}

impl From<&ResourceHints> for EffectiveResources {
    fn from(hints: &ResourceHints) -> Self {
        Self {
            memory: hints.memory,
            cpus: hints.cpus,
            placement_group: hints.placement_group.clone(),
        }
    }
}

/// The result of one task's execution, as reported by the [`Executor`](super::Executor).
#[derive(Debug, Clone)]
pub enum Outcome<V> {
    Success(V),
    Failure { kind: String, detail: String },
}

/// Errors an [`Executor`](super::Executor) implementation can surface from
/// `launch` itself (as opposed to a task's own [`Outcome::Failure`]).
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("executor unavailable: {0}")]
    Unavailable(String),
}

/// Result of [`Executor::await_any`](super::Executor::await_any): the handles
/// that finished, paired with their outcome, plus whatever didn't.
pub struct AwaitAnyResult<H, V> {
    pub finished: Vec<(H, Outcome<V>)>,
    pub remaining: Vec<H>,
}
