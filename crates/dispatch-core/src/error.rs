//! The typed errors a run can return.

use thiserror::Error;

use crate::task::TaskId;

/// The outcome a failed or cancelled run returns to the caller. One
/// `thiserror` variant per failure mode, with a `.kind()` accessor returning
/// the stable tag the CLI uses for exit-code mapping.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("task {task_id} exhausted its retry budget after {attempts} attempts: {cause}")]
    RetriesExhausted {
        task_id: TaskId,
        attempts: u32,
        cause: String,
    },

    #[error("task {task_id} failed with a non-retryable error: {cause}")]
    NonRetryable { task_id: TaskId, cause: String },

    #[error("run cancelled: {completed} completed, {inflight_at_cancel} in flight at cancel")]
    Cancelled {
        completed: usize,
        inflight_at_cancel: usize,
    },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("executor unavailable: {0}")]
    ExecutorUnavailable(String),
}

impl DispatchError {
    /// Stable wire tag matching the external error taxonomy.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RetriesExhausted { .. } => "RetriesExhausted",
            Self::NonRetryable { .. } => "NonRetryable",
            Self::Cancelled { .. } => "Cancelled",
            Self::InvariantViolation(_) => "InvariantViolation",
            Self::ExecutorUnavailable(_) => "ExecutorUnavailable",
        }
    }

    /// Exit code the CLI runner maps this error onto: fatal task errors and
    /// invariant violations are `2`, cancellation is `3`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cancelled { .. } => 3,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_exit_code_match_the_wire_taxonomy() {
        let err = DispatchError::RetriesExhausted {
            task_id: TaskId(1),
            attempts: 3,
            cause: "boom".into(),
        };
        assert_eq!(err.kind(), "RetriesExhausted");
        assert_eq!(err.exit_code(), 2);

        let err = DispatchError::Cancelled {
            completed: 2,
            inflight_at_cancel: 1,
        };
        assert_eq!(err.kind(), "Cancelled");
        assert_eq!(err.exit_code(), 3);
    }
}
