//! FIFO evaluation service.
//!
//! A single worker thread owns a [`BatchEvaluator`] and processes submitted
//! maps in arrival order, each one fully before the next. Every submission
//! carries its own response channel.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use log::{debug, info};
use thiserror::Error;

use super::batch::{BatchEvaluator, BatchSummary};
use super::loader::MapLoader;
use crate::error::EvalError;
use crate::evaluation::EvaluationOutcome;

/// Result delivered for one submitted map.
pub type JobResult = Result<EvaluationOutcome, EvalError>;

/// Map submission with response channel.
pub struct EvaluationJob {
    /// Map to evaluate.
    pub map_path: PathBuf,
    /// Channel to send the result back.
    pub response_tx: mpsc::Sender<JobResult>,
}

impl std::fmt::Debug for EvaluationJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationJob")
            .field("map_path", &self.map_path)
            .field("response_tx", &"...")
            .finish()
    }
}

/// Sender end of the job channel (held by submitters).
pub type JobSender = mpsc::Sender<EvaluationJob>;

/// Receiver end of the job channel (held by the worker).
pub type JobReceiver = mpsc::Receiver<EvaluationJob>;

/// Queue errors.
#[derive(Error, Debug)]
pub enum QueueError {
    /// Worker thread could not be started
    #[error("failed to spawn evaluation worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// Worker is gone; no more submissions are accepted
    #[error("evaluation worker has stopped")]
    Closed,

    /// Worker panicked
    #[error("evaluation worker panicked")]
    WorkerPanicked,
}

/// Handle to the evaluation worker.
pub struct EvaluationQueue {
    sender: JobSender,
    handle: JoinHandle<BatchSummary>,
}

impl EvaluationQueue {
    /// Spawn the worker thread around `evaluator`.
    pub fn spawn<L: MapLoader + 'static>(evaluator: BatchEvaluator<L>) -> Result<Self, QueueError> {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("evaluator".into())
            .spawn(move || run_worker(evaluator, receiver))?;
        Ok(Self { sender, handle })
    }

    /// Enqueue a map; the returned receiver yields its result.
    pub fn submit(&self, map_path: impl Into<PathBuf>) -> Result<mpsc::Receiver<JobResult>, QueueError> {
        let (response_tx, response_rx) = mpsc::channel();
        self.sender
            .send(EvaluationJob {
                map_path: map_path.into(),
                response_tx,
            })
            .map_err(|_| QueueError::Closed)?;
        Ok(response_rx)
    }

    /// Enqueue a map and block until it has been evaluated.
    pub fn evaluate(&self, map_path: impl Into<PathBuf>) -> Result<JobResult, QueueError> {
        self.submit(map_path)?.recv().map_err(|_| QueueError::Closed)
    }

    /// Finish queued work, stop the worker and return its counts.
    pub fn shutdown(self) -> Result<BatchSummary, QueueError> {
        drop(self.sender);
        self.handle.join().map_err(|_| QueueError::WorkerPanicked)
    }
}

impl std::fmt::Debug for EvaluationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationQueue")
            .field("worker", &self.handle.thread().name())
            .finish()
    }
}

fn run_worker<L: MapLoader>(mut evaluator: BatchEvaluator<L>, receiver: JobReceiver) -> BatchSummary {
    info!("[Queue] Worker started");
    while let Ok(job) = receiver.recv() {
        let result = evaluator.process(&job.map_path);
        if job.response_tx.send(result).is_err() {
            debug!("[Queue] Submitter of {} went away", job.map_path.display());
        }
    }
    let summary = evaluator.summary();
    info!(
        "[Queue] Worker stopped after {} maps ({} failed)",
        summary.total(),
        summary.failed
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use crate::cloud::GroundTruthCloud;
    use crate::config::EvaluationRequest;
    use crate::core::{Point, VoxelIndex};
    use crate::error::Stage;
    use crate::evaluation::EvaluationSession;
    use crate::map::{GlobalMap, ReconstructedMap, TsdfGrid};

    /// Records load order and fails on paths containing "bad".
    struct RecordingLoader {
        seen: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl MapLoader for RecordingLoader {
        fn load(&self, path: &Path) -> Result<ReconstructedMap, EvalError> {
            self.seen.lock().unwrap().push(path.to_path_buf());
            if path.to_string_lossy().contains("bad") {
                return Err(EvalError::load(path, "corrupt"));
            }
            let mut grid = TsdfGrid::new(Point::ZERO, 0.1, [4, 4, 4], 0.3);
            grid.set_voxel(VoxelIndex::new(1, 1, 1), 0.0, 1.0);
            Ok(ReconstructedMap::Grid(GlobalMap::new(grid)))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn queue(seen: Arc<Mutex<Vec<PathBuf>>>) -> EvaluationQueue {
        let cloud = GroundTruthCloud::new(vec![Point::new(0.15, 0.15, 0.15)]);
        let session = EvaluationSession::new(cloud).unwrap();
        let request = EvaluationRequest {
            evaluate: false,
            ..Default::default()
        };
        let evaluator = BatchEvaluator::with_loader(session, request, RecordingLoader { seen });
        EvaluationQueue::spawn(evaluator).unwrap()
    }

    #[test]
    fn test_fifo_order_and_failure_isolation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let queue = queue(seen.clone());

        let first = queue.submit("a.json").unwrap();
        let second = queue.submit("bad.json").unwrap();
        let third = queue.submit("c.json").unwrap();

        assert!(first.recv().unwrap().is_ok());
        let err = second.recv().unwrap().unwrap_err();
        assert_eq!(err.stage(), Stage::Load);
        assert!(third.recv().unwrap().is_ok());

        let summary = queue.shutdown().unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);

        let seen = seen.lock().unwrap();
        let names: Vec<_> = seen.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["a.json", "bad.json", "c.json"]);
    }

    #[test]
    fn test_evaluate_blocks_for_result() {
        let queue = queue(Arc::new(Mutex::new(Vec::new())));
        let outcome = queue.evaluate("a.json").unwrap().unwrap();
        assert!(outcome.reconstruction.is_none());
        queue.shutdown().unwrap();
    }
}
