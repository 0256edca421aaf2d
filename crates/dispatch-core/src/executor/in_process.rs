//! A reference, in-process [`Executor`] used by the CLI's example manifest
//! and by tests. Production integrations are expected to implement
//! [`Executor`] against a real remote worker pool instead.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use super::trait_def::Executor;
use super::types::{AwaitAnyResult, EffectiveResources, ExecutorError, Outcome};

/// A unit of work the [`InProcessExecutor`] knows how to run: an async
/// closure producing an [`Outcome`].
pub type InProcessJob<V> =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = Outcome<V>> + Send>> + Send + Sync>;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct InProcessHandle(u64);

struct Slot<V> {
    outcome: Option<Outcome<V>>,
    cancelled: bool,
}

/// Runs each submitted job as a spawned `tokio` task, tracking completion in
/// a small registry guarded by a `Mutex` and signalled with a [`Notify`].
/// Has no persistence: it only tracks in-memory slots for the lifetime of
/// one run.
pub struct InProcessExecutor<V> {
    next_id: AtomicU64,
    slots: Arc<Mutex<HashMap<u64, Slot<V>>>>,
    notify: Arc<Notify>,
}

impl<V> Default for InProcessExecutor<V> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            slots: Arc::new(Mutex::new(HashMap::new())),
            notify: Arc::new(Notify::new()),
        }
    }
}

impl<V> InProcessExecutor<V> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<V: Send + 'static> Executor for InProcessExecutor<V> {
    type Work = InProcessJob<V>;
    type Value = V;
    type Handle = InProcessHandle;

    async fn launch(
        &self,
        work: &Self::Work,
        _hints: EffectiveResources,
    ) -> Result<Self::Handle, ExecutorError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.slots.lock().await.insert(
            id,
            Slot {
                outcome: None,
                cancelled: false,
            },
        );

        let job = work.clone();
        let slots = Arc::clone(&self.slots);
        let notify = Arc::clone(&self.notify);
        tokio::spawn(async move {
            let outcome = job().await;
            let mut guard = slots.lock().await;
            if let Some(slot) = guard.get_mut(&id) {
                if !slot.cancelled {
                    slot.outcome = Some(outcome);
                }
            }
            drop(guard);
            notify.notify_waiters();
        });

        Ok(InProcessHandle(id))
    }

    async fn await_any(
        &self,
        handles: &[Self::Handle],
        n: usize,
    ) -> AwaitAnyResult<Self::Handle, Self::Value> {
        let want = n.min(handles.len()).max(1);
        loop {
            // Register interest before checking, so a notification fired
            // between the check and the await below is never missed.
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
        let mut guard = self.slots.lock().await;
        if let Some(slot) = guard.get_mut(&handle.0) {
            slot.cancelled = true;
            slot.outcome = None;
        }
    }
}
