//! The external execution contract the Dispatcher drives.

use std::fmt::Debug;
use std::hash::Hash;

use async_trait::async_trait;

use super::types::{AwaitAnyResult, EffectiveResources, ExecutorError, Outcome};

/// Launches units of work remotely and reports back on their completion.
///
/// The Dispatcher never assumes anything about how `Handle` is represented
/// internally -- it only clones, hashes, and compares it, and otherwise
/// routes everything through the Dispatcher's own
/// [`SubmissionId`](crate::dispatcher::SubmissionId) layer.
#[async_trait]
pub trait Executor: Send + Sync {
    type Work: Send + Sync;
    type Value: Send;
    type Handle: Clone + Eq + Hash + Debug + Send + Sync;

    /// Non-blocking submission. Returns as soon as the remote side
    /// acknowledges receipt, not when it finishes.
    async fn launch(
        &self,
        work: &Self::Work,
        hints: EffectiveResources,
    ) -> Result<Self::Handle, ExecutorError>;

    /// Blocks until at least `min(n, handles.len())` handles finish.
    async fn await_any(
        &self,
        handles: &[Self::Handle],
        n: usize,
    ) -> AwaitAnyResult<Self::Handle, Self::Value>;

    /// Retrieves the outcome of a single handle, used by tests and by
    /// callers inspecting one submission outside the main loop.
    async fn await_one(&self, handle: &Self::Handle) -> Outcome<Self::Value>;

    /// Best-effort cancellation. A cancelled handle must eventually stop
    /// appearing in future [`Self::await_any`] results.
    async fn cancel(&self, handle: &Self::Handle);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check that `Executor` can be used as a trait object once
    /// its associated types are fixed.
    #[allow(dead_code)]
    fn assert_object_safe<W: Send + Sync, V: Send>() {
        fn _takes(_: &dyn Executor<Work = W, Value = V, Handle = u64>) {}
    }
}
