//! Per-run state: the two admission queues, the in-flight map, and the
//! result slots.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::task::{Task, TaskSnapshot};

/// Dispatcher-assigned id decoupling the in-flight map from the executor's
/// own `Handle` representation. Monotonic within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionId(u64);

/// All the state for one [`crate::dispatcher::Dispatcher::start_run`]
/// invocation, parameterized over the work type `W`, the success value type
/// `V`, and the executor's handle type `H`.
///
/// Two admission paths, per the resolved ambiguity between AIMD-gated
/// admission and retry/straggler resubmission: the not-yet-admitted slice of
/// the original input is the only thing the `BatchScaler` ever sees;
/// `resubmit_queue` is drained unconditionally every loop iteration,
/// bypassing the scaler.
pub struct RunState<W, V, H: Clone + Eq + Hash> {
    pending_input: Vec<Option<Task<W>>>,
    pending_count: usize,
    pub(crate) resubmit_queue: VecDeque<Task<W>>,
    next_submission_id: u64,
    pub(crate) inflight: HashMap<SubmissionId, (H, Task<W>)>,
    handle_index: HashMap<H, SubmissionId>,
    results: Vec<Option<V>>,
    completed: usize,
}

impl<W, V, H: Clone + Eq + Hash> RunState<W, V, H> {
    pub fn new(tasks: Vec<Task<W>>) -> Self {
        let len = tasks.len();
        let pending_input = tasks
            .into_iter()
            .enumerate()
            .map(|(i, mut t)| {
                t.origin_index = i;
                Some(t)
            })
            .collect();
        Self {
            pending_input,
            pending_count: len,
            resubmit_queue: VecDeque::new(),
            next_submission_id: 0,
            inflight: HashMap::new(),
            handle_index: HashMap::new(),
            results: (0..len).map(|_| None).collect(),
            completed: 0,
        }
    }

    /// True while any task from the original input has not yet been handed
    /// to the scaler.
    pub fn admission_pending(&self) -> bool {
        self.pending_count > 0
    }

    /// Removes and returns the tasks at the given original-input indices,
    /// preserving the order the scaler handed back.
    pub fn take_admission_batch(&mut self, indices: &[usize]) -> Vec<Task<W>> {
        let mut out = Vec::with_capacity(indices.len());
        for &idx in indices {
            if let Some(slot) = self.pending_input.get_mut(idx) {
                if let Some(task) = slot.take() {
                    self.pending_count -= 1;
                    out.push(task);
                }
            }
        }
        out
    }

    fn next_submission_id(&mut self) -> SubmissionId {
        let id = self.next_submission_id;
        self.next_submission_id += 1;
        SubmissionId(id)
    }

    pub(crate) fn insert_inflight(&mut self, handle: H, task: Task<W>) {
        let id = self.next_submission_id();
        self.handle_index.insert(handle.clone(), id);
        self.inflight.insert(id, (handle, task));
    }

    pub(crate) fn remove_inflight(&mut self, handle: &H) -> Option<(SubmissionId, Task<W>)> {
        let id = self.handle_index.remove(handle)?;
        let (_, task) = self.inflight.remove(&id)?;
        Some((id, task))
    }

    pub(crate) fn inflight_handles(&self) -> Vec<H> {
        self.inflight.values().map(|(h, _)| h.clone()).collect()
    }

    pub(crate) fn inflight_snapshots(&self) -> Vec<(H, TaskSnapshot)> {
        self.inflight
            .values()
            .map(|(h, t)| (h.clone(), t.snapshot()))
            .collect()
    }

    pub(crate) fn record_success(&mut self, origin_index: usize, value: V) {
        self.results[origin_index] = Some(value);
        self.completed += 1;
    }

    pub(crate) fn completed_count(&self) -> usize {
        self.completed
    }

    pub(crate) fn into_results(self) -> Vec<V> {
        self.results
            .into_iter()
            .map(|v| v.expect("every result slot must be filled on a successful run"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_admission_batch_respects_requested_indices() {
        let tasks = vec![
            Task::new(crate::task::TaskId(0), "a"),
            Task::new(crate::task::TaskId(1), "b"),
            Task::new(crate::task::TaskId(2), "c"),
        ];
        let mut state: RunState<&str, (), u64> = RunState::new(tasks);
        assert!(state.admission_pending());
        let batch = state.take_admission_batch(&[0, 2]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].origin_index, 0);
        assert_eq!(batch[1].origin_index, 2);
        assert!(state.admission_pending(), "index 1 is still pending");
        let rest = state.take_admission_batch(&[1]);
        assert_eq!(rest.len(), 1);
        assert!(!state.admission_pending());
    }
}
