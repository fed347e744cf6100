//! Batch and service drivers.
//!
//! - [`MapLoader`]: where maps come from ([`JsonMapLoader`] by default)
//! - [`BatchEvaluator`]: evaluates maps in order, writes reports and artifacts
//! - [`EvaluationQueue`]: FIFO worker thread with per-submission responses

mod batch;
mod loader;
mod queue;

pub use batch::{BatchEvaluator, BatchSummary};
pub use loader::{JsonMapLoader, MapLoader};
pub use queue::{EvaluationJob, EvaluationQueue, JobReceiver, JobResult, JobSender, QueueError};
