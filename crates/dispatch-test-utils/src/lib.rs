//! Shared test infrastructure for `dispatch-core` and its consumers.
//!
//! The only external collaborator the Dispatcher has is the `Executor`, so
//! this crate's entire surface is a deterministic, scriptable, in-memory
//! fake of it.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use dispatch_core::executor::{AwaitAnyResult, EffectiveResources, Executor, ExecutorError, Outcome};

/// One step in a [`ScriptedJob`]'s outcome sequence: what the fake executor
/// reports the `n`th attempt at this job.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome<V> {
    Success(V),
    Failure { kind: String, detail: String },
}

impl<V> ScriptedOutcome<V> {
    pub fn failure(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Failure {
            kind: kind.into(),
            detail: detail.into(),
        }
    }
}

/// A task descriptor for [`FakeExecutor`]: a queue of outcomes consumed one
/// per submission attempt. The last step repeats if the job is submitted
/// more times than it has scripted steps for.
pub struct ScriptedJob<V> {
    steps: Mutex<VecDeque<ScriptedOutcome<V>>>,
    delay: Duration,
}

impl<V: Clone> ScriptedJob<V> {
    pub fn new(steps: Vec<ScriptedOutcome<V>>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            delay: Duration::ZERO,
        })
    }

    pub fn always_succeeds(value: V) -> Arc<Self> {
        Self::new(vec![ScriptedOutcome::Success(value)])
    }

    /// Same as [`Self::new`] but each attempt sleeps `delay` before
    /// resolving -- used to simulate a straggler.
    pub fn with_delay(steps: Vec<ScriptedOutcome<V>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            delay,
        })
    }

    async fn next_outcome(&self) -> ScriptedOutcome<V> {
        let mut guard = self.steps.lock().await;
        if guard.len() > 1 {
            guard.pop_front().expect("checked non-empty above")
        } else {
            guard
                .front()
                .cloned()
                .expect("ScriptedJob must have at least one step")
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FakeHandle(u64);

struct Slot<V> {
    outcome: Option<Outcome<V>>,
    cancelled: bool,
}

/// A deterministic, in-memory [`Executor`] fake. Every launched job runs as
/// a spawned `tokio` task that immediately resolves to its next scripted
/// outcome; `launch_count`/`cancel_count` are exposed for assertions.
pub struct FakeExecutor<V> {
    next_id: AtomicU64,
    slots: Arc<Mutex<HashMap<u64, Slot<V>>>>,
    notify: Arc<Notify>,
    launch_count: AtomicU64,
    cancel_count: AtomicU64,
}

impl<V> Default for FakeExecutor<V> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            slots: Arc::new(Mutex::new(HashMap::new())),
            notify: Arc::new(Notify::new()),
            launch_count: AtomicU64::new(0),
            cancel_count: AtomicU64::new(0),
        }
    }
}

impl<V> FakeExecutor<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launch_count(&self) -> u64 {
        self.launch_count.load(Ordering::SeqCst)
    }

    pub fn cancel_count(&self) -> u64 {
        self.cancel_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> Executor for FakeExecutor<V> {
    type Work = Arc<ScriptedJob<V>>;
    type Value = V;
    type Handle = FakeHandle;

    async fn launch(
        &self,
        work: &Self::Work,
        _hints: EffectiveResources,
    ) -> Result<Self::Handle, ExecutorError> {
        self.launch_count.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.slots.lock().await.insert(
            id,
            Slot {
                outcome: None,
                cancelled: false,
            },
        );

        let job = Arc::clone(work);
        let slots = Arc::clone(&self.slots);
        let notify = Arc::clone(&self.notify);
        tokio::spawn(async move {
            if job.delay > Duration::ZERO {
                tokio::time::sleep(job.delay).await;
            }
            let scripted = job.next_outcome().await;
            let outcome = match scripted {
                ScriptedOutcome::Success(v) => Outcome::Success(v),
                ScriptedOutcome::Failure { kind, detail } => Outcome::Failure { kind, detail },
            };
            let mut guard = slots.lock().await;
            if let Some(slot) = guard.get_mut(&id) {
                if !slot.cancelled {
                    slot.outcome = Some(outcome);
                }
            }
            drop(guard);
            notify.notify_waiters();
        });

        Ok(FakeHandle(id))
    }

    async fn await_any(
        &self,
        handles: &[Self::Handle],
        n: usize,
    ) -> AwaitAnyResult<Self::Handle, Self::Value> {
        let want = n.min(handles.len()).max(1);
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut guard = self.slots.lock().await;
                let mut finished = Vec::new();
                let mut remaining = Vec::new();
                for h in handles {
                    match guard.get_mut(&h.0).and_then(|s| s.outcome.take()) {
                        Some(outcome) => finished.push((*h, outcome)),
                        None => remaining.push(*h),
                    }
                }
                if finished.len() >= want || finished.len() == handles.len() {
                    return AwaitAnyResult { finished, remaining };
                }
            }
            notified.await;
        }
    }

    async fn await_one(&self, handle: &Self::Handle) -> Outcome<Self::Value> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut guard = self.slots.lock().await;
                if let Some(outcome) = guard.get_mut(&handle.0).and_then(|s| s.outcome.take()) {
                    return outcome;
                }
            }
            notified.await;
        }
    }

    async fn cancel(&self, handle: &Self::Handle) {
        self.cancel_count.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.slots.lock().await;
        if let Some(slot) = guard.get_mut(&handle.0) {
            slot.cancelled = true;
            slot.outcome = None;
        }
    }
}
