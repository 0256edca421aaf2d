//! Concurrent task dispatch: submit a batch of work to a remote executor,
//! scale admission with an AIMD controller, retry failures with resource
//! escalation, and reclaim stragglers.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod retry;
pub mod scaler;
pub mod straggler;
pub mod task;

pub use config::{DispatchDefaults, DispatchFileConfig};
pub use dispatcher::{CancellationHandle, DispatchOptions, Dispatcher};
pub use error::DispatchError;
pub use executor::Executor;
pub use retry::RetryPolicy;
pub use scaler::BatchScaler;
pub use straggler::StragglerDetector;
pub use task::{ResourceHints, RetryRule, Task, TaskId};
