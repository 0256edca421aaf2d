//! The remote-execution collaborator: launch work, await completions, cancel.

pub mod in_process;
pub mod trait_def;
pub mod types;

pub use in_process::{InProcessExecutor, InProcessHandle, InProcessJob};
pub use trait_def::Executor;
pub use types::{AwaitAnyResult, EffectiveResources, ExecutorError, Outcome};
